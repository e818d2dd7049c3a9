//! Filename and extension extraction from a URL path.

use std::path::Path;

/// Extracts the last path segment from a URL for use as a filename hint.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
/// Percent-encoding is left as-is.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Extension of the URL's last path segment, including the leading dot
/// (`https://h/a/clip.wav?x=1` → `.wav`). `None` when there is no extension.
pub fn extension_from_url_path(url: &str) -> Option<String> {
    let name = filename_from_url_path(url)?;
    let ext = Path::new(&name).extension()?.to_str()?;
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext))
}

//! URL modeling and filename derivation.
//!
//! Derives safe local filenames from the URL path, sanitized for Linux
//! filesystems.

mod path;
mod sanitize;

pub use path::{extension_from_url_path, filename_from_url_path};
pub use sanitize::sanitize_filename_for_linux;

/// Default filename when the URL path yields nothing usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// The URL's bare filename, sanitized.
///
/// # Examples
///
/// - `bare_filename("https://example.com/audio/clip.wav")` → `"clip.wav"`
/// - `bare_filename("https://example.com/")` → `"download.bin"`
pub fn bare_filename(url: &str) -> String {
    let raw = match filename_from_url_path(url) {
        Some(c) => c,
        None => return DEFAULT_FILENAME.to_string(),
    };

    let sanitized = sanitize_filename_for_linux(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_filename_from_url_path() {
        assert_eq!(bare_filename("https://example.com/clip.wav"), "clip.wav");
        assert_eq!(
            bare_filename("https://cdn.example.com/project/site/rec-0001.flac"),
            "rec-0001.flac"
        );
    }

    #[test]
    fn bare_filename_empty_url_path_fallback() {
        assert_eq!(bare_filename("https://example.com/"), "download.bin");
        assert_eq!(bare_filename("https://example.com"), "download.bin");
    }

    #[test]
    fn bare_filename_reserved_names_fallback() {
        assert_eq!(bare_filename("https://example.com/."), "download.bin");
        assert_eq!(bare_filename("https://example.com/.."), "download.bin");
    }

    #[test]
    fn bare_filename_sanitizes_encoded_spaces() {
        assert_eq!(bare_filename("https://example.com/my%20clip.wav"), "my%20clip.wav");
        assert_eq!(bare_filename("https://example.com/..clip.wav"), "clip.wav");
    }
}

//! Linux-safe filename and path-component sanitization.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename or directory name for safe use on Linux.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Trims leading/trailing whitespace and dots
/// - Limits length to 255 bytes
///
/// Inner spaces are kept; callers that want underscores replace them first.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

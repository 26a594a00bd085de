//! Small shared helpers: filename sanitization and duration formatting.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters that are unsafe in filenames passed to external tools:
/// shell metacharacters, quoting characters, and filesystem separators.
static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*'`$;&(){}\[\]]"#).unwrap());

/// Sanitizes a title for use as a filename.
///
/// Removes shell metacharacters and filesystem-unsafe characters, replaces
/// spaces with underscores, and caps the length at 100 characters (respecting
/// UTF-8 boundaries).
pub fn sanitize_filename(filename: &str) -> String {
    let stripped = UNSAFE_FILENAME_CHARS.replace_all(filename, "");
    let underscored = stripped.replace(' ', "_");
    underscored.chars().take(100).collect()
}

/// Format seconds as M:SS or H:MM:SS.
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

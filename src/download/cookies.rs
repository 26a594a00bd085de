//! Netscape cookie file handling for authenticated downloads.
//!
//! Users upload a `youtube_cookies.txt` exported from their browser; it is
//! validated, stored at the configured path, and passed to yt-dlp with
//! `--cookies` on every invocation while it exists.

use std::path::PathBuf;

use crate::core::config;
use crate::core::error::AppError;

const NETSCAPE_HEADER: &str = "# Netscape HTTP Cookie File";

/// Checks that the content looks like a Netscape cookie file: the standard
/// header comment plus at least one cookie line with 7 tab-separated fields.
pub fn validate_cookie_content(content: &str) -> Result<(), AppError> {
    if !content.lines().any(|l| l.trim_start().starts_with(NETSCAPE_HEADER)) {
        return Err(AppError::Validation(
            "not a Netscape cookie file (missing header)".to_string(),
        ));
    }

    let has_cookie_line = content
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .any(|l| l.split('\t').count() >= 7);

    if !has_cookie_line {
        return Err(AppError::Validation(
            "cookie file contains no cookie entries".to_string(),
        ));
    }

    Ok(())
}

/// Whether a readable, structurally valid cookie file exists at `path`.
pub fn is_valid_cookie_file(path: &str) -> bool {
    match std::fs::read_to_string(path) {
        Ok(content) => validate_cookie_content(&content).is_ok(),
        Err(_) => false,
    }
}

/// The configured cookie file path, but only when a valid file is present
/// there. Returns `None` when downloads should run without cookies.
pub fn resolved_cookies_path() -> Option<String> {
    let path = config::cookies_file_path();
    if is_valid_cookie_file(&path) {
        Some(path)
    } else {
        None
    }
}

/// Validates and installs uploaded cookie content at the configured path.
pub fn install_cookies(content: &str) -> Result<PathBuf, AppError> {
    validate_cookie_content(content)?;

    let path = PathBuf::from(config::cookies_file_path());
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, content)?;

    log::info!("Installed cookie file at {}", path.display());
    Ok(path)
}

/// Reads the currently installed cookie file back, for export to the user.
pub fn read_installed_cookies() -> Result<String, AppError> {
    let path = config::cookies_file_path();
    if !is_valid_cookie_file(&path) {
        return Err(AppError::Validation(
            "no valid cookie file is currently installed".to_string(),
        ));
    }
    Ok(std::fs::read_to_string(&path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "# Netscape HTTP Cookie File\n# comment\n.youtube.com\tTRUE\t/\tTRUE\t1999999999\tSID\tabc123\n";

    #[test]
    fn test_validate_accepts_netscape_file() {
        assert!(validate_cookie_content(VALID).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_header() {
        let content = ".youtube.com\tTRUE\t/\tTRUE\t1999999999\tSID\tabc123\n";
        assert!(validate_cookie_content(content).is_err());
    }

    #[test]
    fn test_validate_rejects_header_without_entries() {
        let content = "# Netscape HTTP Cookie File\n# nothing else\n";
        assert!(validate_cookie_content(content).is_err());
    }

    #[test]
    fn test_validate_rejects_short_lines() {
        let content = "# Netscape HTTP Cookie File\n.youtube.com\tTRUE\t/\n";
        assert!(validate_cookie_content(content).is_err());
    }

    #[test]
    fn test_is_valid_cookie_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");
        std::fs::write(&path, VALID).unwrap();
        assert!(is_valid_cookie_file(path.to_str().unwrap()));
        assert!(!is_valid_cookie_file(dir.path().join("missing.txt").to_str().unwrap()));
    }
}

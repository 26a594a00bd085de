use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Path to the cookies file used for YouTube authentication.
/// Read from YTDL_COOKIES_FILE; the bot also rewrites this file when a user
/// uploads fresh cookies via /cookies.
pub static YTDL_COOKIES_FILE: Lazy<String> =
    Lazy::new(|| env::var("YTDL_COOKIES_FILE").unwrap_or_else(|_| "youtube_cookies.txt".to_string()));

/// Download folder path
/// Read from DOWNLOAD_FOLDER environment variable, defaults to ./downloads.
/// Supports tilde (~) expansion for home directory.
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "downloads".to_string()));

/// Log file path for the combined terminal + file logger
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "tuberelay.log".to_string()));

/// Port for the liveness endpoint. Hosting platforms inject PORT; fall back
/// to HEALTH_PORT and then 8080 for local runs.
pub static HEALTH_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("PORT")
        .or_else(|_| env::var("HEALTH_PORT"))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
});

/// Returns the cookies file path with tilde expansion applied.
pub fn cookies_file_path() -> String {
    let raw = YTDL_COOKIES_FILE.as_str();
    if std::path::Path::new(raw).is_absolute() {
        raw.to_string()
    } else {
        shellexpand::tilde(raw).to_string()
    }
}

/// Returns the download folder path with tilde expansion applied.
pub fn download_folder_path() -> String {
    shellexpand::tilde(DOWNLOAD_FOLDER.as_str()).to_string()
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for a single yt-dlp download invocation (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 300; // 5 minutes

    /// Timeout for a yt-dlp metadata probe (in seconds)
    pub const METADATA_TIMEOUT_SECS: u64 = 120; // 2 minutes

    /// yt-dlp download timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }

    /// yt-dlp metadata probe timeout duration
    pub fn metadata_timeout() -> Duration {
        Duration::from_secs(METADATA_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for fetching a third-party page during embedded-link scanning (in seconds)
    pub const PAGE_FETCH_TIMEOUT_SECS: u64 = 30;

    /// Request timeout for the Telegram client (in seconds).
    /// Generous because file uploads of full-length videos go through it.
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Page fetch timeout duration
    pub fn page_fetch_timeout() -> Duration {
        Duration::from_secs(PAGE_FETCH_TIMEOUT_SECS)
    }

    /// Telegram client timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Validation configuration
pub mod validation {
    /// Maximum URL length (RFC 7230 recommends 8000, but we use 2048 for safety)
    pub const MAX_URL_LENGTH: usize = 2048;

    /// Maximum number of links accepted in one batch
    pub const MAX_BATCH_LINKS: usize = 50;
}

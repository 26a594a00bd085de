//! yt-dlp backed implementation of the [`MediaTool`] seam.
//!
//! All interaction with the external tool happens here: building the
//! argument list for a tier, running the process with a timeout, parsing
//! `--dump-json` output, and classifying stderr for the logs.

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::core::config;
use crate::core::error::AppError;
use crate::download::cookies;
use crate::download::metadata::VideoMetadata;
use crate::download::tier::AttemptSpec;
use crate::download::tool::MediaTool;
use crate::resolve::VideoId;

/// Rough classification of yt-dlp failures, used for logging and for
/// deciding what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorKind {
    InvalidCookies,
    BotDetection,
    VideoUnavailable,
    Network,
    Unknown,
}

/// Classifies a yt-dlp stderr blob into a coarse error kind.
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorKind {
    let lower = stderr.to_lowercase();

    if lower.contains("cookies are no longer valid") || lower.contains("cookies") && lower.contains("expired") {
        YtDlpErrorKind::InvalidCookies
    } else if lower.contains("sign in to confirm") || lower.contains("not a bot") || lower.contains("captcha") {
        YtDlpErrorKind::BotDetection
    } else if lower.contains("video unavailable")
        || lower.contains("private video")
        || lower.contains("has been removed")
        || lower.contains("age-restricted")
    {
        YtDlpErrorKind::VideoUnavailable
    } else if lower.contains("unable to download")
        || lower.contains("timed out")
        || lower.contains("connection")
        || lower.contains("network")
    {
        YtDlpErrorKind::Network
    } else {
        YtDlpErrorKind::Unknown
    }
}

/// Production [`MediaTool`] that shells out to the configured yt-dlp binary.
pub struct YtDlp {
    bin: String,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::from_env()
    }
}

impl YtDlp {
    /// Uses the binary path from `YTDL_BIN` (or `yt-dlp` on PATH).
    pub fn from_env() -> Self {
        Self {
            bin: config::YTDL_BIN.clone(),
        }
    }

    /// Runs the binary with the given args and a hard timeout. The process
    /// is not interrupted mid-flight by session cancellation — the batch
    /// layer only polls between links.
    async fn run(&self, args: &[String], limit: Duration) -> Result<std::process::Output, AppError> {
        log::debug!("Running: {} {}", self.bin, args.join(" "));

        timeout(limit, TokioCommand::new(&self.bin).args(args).output())
            .await
            .map_err(|_| AppError::Download(format!("{} timed out after {}s", self.bin, limit.as_secs())))?
            .map_err(|e| AppError::Download(format!("failed to execute {}: {}", self.bin, e)))
    }

    /// Common tail arguments: cookies (when configured and present) and the
    /// canonical watch URL.
    fn push_common_args(args: &mut Vec<String>, id: &VideoId) {
        if let Some(cookies_path) = cookies::resolved_cookies_path() {
            args.push("--cookies".to_string());
            args.push(cookies_path);
        }
        args.push("--no-playlist".to_string());
        args.push(id.watch_url());
    }
}

#[async_trait]
impl MediaTool for YtDlp {
    async fn extract_metadata(&self, id: &VideoId, spec: &AttemptSpec) -> Result<VideoMetadata, AppError> {
        let mut args: Vec<String> = vec![
            "--dump-json".to_string(),
            "--skip-download".to_string(),
            "--format".to_string(),
            spec.format.to_string(),
        ];
        Self::push_common_args(&mut args, id);

        let output = self.run(&args, config::download::metadata_timeout()).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let kind = analyze_ytdlp_error(&stderr);
            log::warn!("yt-dlp metadata extraction failed for {} ({:?})", id, kind);
            log::debug!("yt-dlp stderr: {}", stderr);
            return Err(AppError::Download(format!(
                "metadata extraction failed ({:?})",
                kind
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        VideoMetadata::from_dump_json(&stdout)
    }

    async fn fetch(&self, id: &VideoId, spec: &AttemptSpec, destination_template: &str) -> Result<(), AppError> {
        let mut args: Vec<String> = vec![
            "--format".to_string(),
            spec.format.to_string(),
        ];
        if let Some(container) = spec.merge_container {
            args.push("--merge-output-format".to_string());
            args.push(container.to_string());
        }
        if let Some(codec) = spec.extract_audio {
            args.push("--extract-audio".to_string());
            args.push("--audio-format".to_string());
            args.push(codec.to_string());
        }
        args.push("-o".to_string());
        args.push(destination_template.to_string());
        Self::push_common_args(&mut args, id);

        let output = self.run(&args, config::download::ytdlp_timeout()).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let kind = analyze_ytdlp_error(&stderr);
            log::warn!("yt-dlp download failed for {} ({:?})", id, kind);
            log::debug!("yt-dlp stderr: {}", stderr);
            return Err(AppError::Download(format!("download failed ({:?})", kind)));
        }

        Ok(())
    }
}

/// Prints the current yt-dlp version as a startup diagnostic.
///
/// Failing to find the binary is fatal: nothing downstream works without it.
pub async fn print_ytdlp_version() -> Result<(), AppError> {
    let ytdl_bin = &*config::YTDL_BIN;

    let output = timeout(
        Duration::from_secs(10),
        TokioCommand::new(ytdl_bin).arg("--version").output(),
    )
    .await
    .map_err(|_| AppError::Download("yt-dlp --version timed out".to_string()))?
    .map_err(|e| AppError::Download(format!("yt-dlp is not installed or not executable: {}", e)))?;

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        return Err(AppError::Download(
            "yt-dlp --version produced no output".to_string(),
        ));
    }

    log::info!("yt-dlp version: {}", version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_bot_detection() {
        let stderr = "ERROR: Sign in to confirm you're not a bot.";
        assert_eq!(analyze_ytdlp_error(stderr), YtDlpErrorKind::BotDetection);
    }

    #[test]
    fn test_analyze_unavailable() {
        assert_eq!(
            analyze_ytdlp_error("ERROR: Video unavailable"),
            YtDlpErrorKind::VideoUnavailable
        );
        assert_eq!(
            analyze_ytdlp_error("ERROR: Private video. Sign in if you've been granted access"),
            YtDlpErrorKind::VideoUnavailable
        );
    }

    #[test]
    fn test_analyze_network() {
        assert_eq!(
            analyze_ytdlp_error("ERROR: Unable to download webpage: timed out"),
            YtDlpErrorKind::Network
        );
    }

    #[test]
    fn test_analyze_unknown() {
        assert_eq!(analyze_ytdlp_error("something new"), YtDlpErrorKind::Unknown);
    }
}

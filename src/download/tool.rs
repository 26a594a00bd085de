//! The narrow seam in front of the external downloader.
//!
//! The driver never shells out directly: it goes through [`MediaTool`], so
//! tests can script per-tier outcomes without spawning processes. The
//! production implementation is [`crate::download::ytdlp::YtDlp`].

use async_trait::async_trait;

use crate::core::error::AppError;
use crate::download::metadata::VideoMetadata;
use crate::download::tier::AttemptSpec;
use crate::resolve::VideoId;

/// External extraction/download tool interface.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Extracts metadata for a video under the given tier's format
    /// constraint, without downloading anything.
    async fn extract_metadata(&self, id: &VideoId, spec: &AttemptSpec) -> Result<VideoMetadata, AppError>;

    /// Downloads the video under the given tier's constraint into
    /// `destination_template` (which may embed the tool's `%(ext)s`
    /// extension placeholder).
    async fn fetch(&self, id: &VideoId, spec: &AttemptSpec, destination_template: &str) -> Result<(), AppError>;
}

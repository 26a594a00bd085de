//! The fallback download driver.
//!
//! Walks a tier ladder in order for a single video. Each tier is attempted
//! at most once: metadata extraction, then the download itself, then a check
//! that a file actually landed on disk. Any failure moves on to the next
//! tier; only when every tier has failed does the whole operation fail.

use crate::core::error::AppError;
use crate::download::metadata::{find_actual_downloaded_file, DownloadOutcome, VideoMetadata};
use crate::download::tier::{ladder, AttemptSpec};
use crate::download::tool::MediaTool;
use crate::resolve::{extract_video_id, VideoId};

/// Downloads one video by walking the given fallback ladder
/// ([`crate::download::tier::ladder`] for video,
/// [`crate::download::tier::audio_ladder`] for audio extraction).
///
/// `destination_template` may embed the tool's `%(ext)s` placeholder; the
/// returned outcome carries the path of the file that was actually produced.
pub async fn download<T: MediaTool + ?Sized>(
    tool: &T,
    id: &VideoId,
    destination_template: &str,
    tiers: &[AttemptSpec],
) -> Result<DownloadOutcome, AppError> {
    for (index, spec) in tiers.iter().enumerate() {
        log::info!(
            "Attempt {}/{} for {}: {}",
            index + 1,
            tiers.len(),
            id,
            spec.description
        );

        let metadata = match tool.extract_metadata(id, spec).await {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Metadata extraction failed on tier {}: {}", index + 1, e);
                continue;
            }
        };

        if let Err(e) = tool.fetch(id, spec, destination_template).await {
            log::warn!("Download failed on tier {}: {}", index + 1, e);
            continue;
        }

        let file_path = match find_actual_downloaded_file(destination_template) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Tier {} reported success but produced no file: {}", index + 1, e);
                continue;
            }
        };

        log::info!("Downloaded {} via tier {} ({})", id, index + 1, spec.description);
        return Ok(DownloadOutcome {
            file_path,
            title: metadata.title,
            duration_secs: metadata.duration_secs,
            view_count: metadata.view_count,
            method: spec.description.to_string(),
            video_id: id.as_str().to_string(),
        });
    }

    Err(AppError::Download(format!(
        "all {} download methods failed for {}",
        tiers.len(),
        id
    )))
}

/// Resolves a link and extracts metadata for its first video, without
/// downloading anything. Uses the top tier's format constraint so the
/// numbers match what a download would report.
pub async fn probe<T: MediaTool + ?Sized>(
    tool: &T,
    client: &reqwest::Client,
    raw: &str,
) -> Result<VideoMetadata, AppError> {
    let urls = crate::resolve::resolve_to_watch_urls(client, raw).await;

    let first = urls
        .first()
        .ok_or_else(|| AppError::Download(format!("no YouTube video found in {}", raw)))?;

    let id = extract_video_id(first)
        .ok_or_else(|| AppError::Download(format!("no video id in resolved URL {}", first)))?;

    tool.extract_metadata(&id, first_tier()).await
}

fn first_tier() -> &'static AttemptSpec {
    &ladder()[0]
}

//! Metadata types and downloaded-file resolution.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::error::AppError;

/// Extensions yt-dlp is expected to produce for the `%(ext)s` placeholder.
const KNOWN_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "m4a", "mp3", "opus"];

/// Video metadata extracted by the external tool without downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub duration_secs: u64,
    pub view_count: u64,
}

/// Subset of yt-dlp's `--dump-json` output we care about.
#[derive(Debug, Deserialize)]
struct DumpJson {
    title: Option<String>,
    duration: Option<f64>,
    view_count: Option<u64>,
}

impl VideoMetadata {
    /// Parses yt-dlp `--dump-json` output. An unparsable or empty payload is
    /// a metadata-extraction failure for the current tier.
    pub fn from_dump_json(raw: &str) -> Result<Self, AppError> {
        let parsed: DumpJson = serde_json::from_str(raw.trim())
            .map_err(|e| AppError::Download(format!("unparsable yt-dlp metadata: {}", e)))?;

        Ok(Self {
            title: parsed.title.unwrap_or_else(|| "YouTube Video".to_string()),
            duration_secs: parsed.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
            view_count: parsed.view_count.unwrap_or(0),
        })
    }
}

/// Success record for one top-level download call.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub file_path: PathBuf,
    pub title: String,
    pub duration_secs: u64,
    pub view_count: u64,
    /// The winning tier's human-readable description.
    pub method: String,
    pub video_id: String,
}

/// Resolves the actual file produced for an output template.
///
/// yt-dlp substitutes `%(ext)s` itself, so after a download we must find what
/// it actually wrote: first the known extensions are probed directly, then
/// the destination directory is swept for any file sharing the template's
/// stem.
pub fn find_actual_downloaded_file(destination_template: &str) -> Result<PathBuf, AppError> {
    const PLACEHOLDER: &str = ".%(ext)s";

    if !destination_template.contains(PLACEHOLDER) {
        let path = PathBuf::from(destination_template);
        return if path.exists() {
            Ok(path)
        } else {
            Err(AppError::Download(format!(
                "downloaded file not found: {}",
                destination_template
            )))
        };
    }

    let stem = destination_template.replace(PLACEHOLDER, "");

    for ext in KNOWN_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{}", stem, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // Unusual container: sweep the directory for the stem
    let stem_path = Path::new(&stem);
    let dir = stem_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_stem = stem_path.file_name().and_then(|n| n.to_str()).unwrap_or(&stem);

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(file_stem) && !name.ends_with(".part") {
                return Ok(entry.path());
            }
        }
    }

    Err(AppError::Download(format!(
        "no downloaded file matches template {}",
        destination_template
    )))
}

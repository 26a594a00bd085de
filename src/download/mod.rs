//! Download pipeline: the fallback driver, the external-tool seam, and the
//! yt-dlp implementation behind it.

pub mod cleanup;
pub mod cookies;
pub mod driver;
pub mod metadata;
pub mod tier;
pub mod tool;
pub mod ytdlp;

pub use driver::{download, probe};
pub use metadata::{DownloadOutcome, VideoMetadata};
pub use tier::{audio_ladder, ladder, AttemptSpec};
pub use tool::MediaTool;
pub use ytdlp::YtDlp;

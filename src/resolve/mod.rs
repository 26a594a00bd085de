//! Link resolution: turning arbitrary user input into canonical watch URLs.
//!
//! A URL is either "direct" (its host is on the YouTube allow-list) or a
//! third-party page that must be scanned for embedded videos. Either way the
//! output is the canonical `https://www.youtube.com/watch?v=<id>` form.

pub mod classify;
pub mod page_scan;
pub mod video_id;

pub use classify::{classify, Classification};
pub use page_scan::{scan_html, scan_page};
pub use video_id::{extract_video_id, VideoId};

/// Resolves raw user input to zero or more canonical watch URLs.
///
/// Direct URLs collapse to a single canonical URL through the id extractor;
/// anything else goes through the page scanner. An empty result means either
/// "no YouTube video found" or a swallowed fetch/parse failure — the two are
/// only distinguished in the logs (see [`scan_page`]).
pub async fn resolve_to_watch_urls(client: &reqwest::Client, raw: &str) -> Vec<String> {
    match classify(raw) {
        Classification::Direct => match extract_video_id(raw) {
            Some(id) => vec![id.watch_url()],
            None => {
                log::warn!("Direct YouTube URL without an extractable video id: {}", raw);
                Vec::new()
            }
        },
        Classification::NeedsPageScan => scan_page(client, raw).await.into_iter().collect(),
    }
}

//! Direct-URL vs needs-page-scan classification.

use url::Url;

/// Hosts that count as "direct" YouTube URLs. Exact match, case-insensitive.
const DIRECT_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "www.youtu.be",
    "m.youtube.com",
    "music.youtube.com",
];

/// Outcome of classifying a raw URL string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The URL points straight at YouTube; the id extractor handles it.
    Direct,
    /// Anything else: a third-party page that must be scanned for embedded
    /// videos. Malformed input lands here too — scanning will then
    /// legitimately find nothing.
    NeedsPageScan,
}

/// Classifies a raw URL string against the YouTube host allow-list.
///
/// Scheme-agnostic: schemeless inputs like `youtube.com/watch?v=...` are
/// retried with an `https://` prefix before giving up. Never panics and
/// never returns an error.
pub fn classify(raw: &str) -> Classification {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Classification::NeedsPageScan;
    }

    let parsed = Url::parse(trimmed)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| {
            if trimmed.contains("://") {
                None
            } else {
                Url::parse(&format!("https://{}", trimmed)).ok()
            }
        });

    match parsed.as_ref().and_then(|u| u.host_str()) {
        Some(host) => {
            let host = host.to_lowercase();
            if DIRECT_HOSTS.iter().any(|d| *d == host) {
                Classification::Direct
            } else {
                Classification::NeedsPageScan
            }
        }
        None => Classification::NeedsPageScan,
    }
}

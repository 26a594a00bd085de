//! Canonical YouTube video identifier extraction.
//!
//! Every URL shape the bot accepts collapses to an 11-character video id and
//! from there to the canonical `watch?v=` URL. Extraction is deterministic:
//! the same raw input always yields the same id or always yields none.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Hosted URL shapes, tried first: `watch?v=`, shortlink, `/embed/`, `/v/`,
/// `/shorts/` (youtube-nocookie embeds included).
static HOSTED_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube(?:-nocookie)?\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)([A-Za-z0-9_-]{11})",
    )
    .unwrap()
});

/// Inline-script key/value form: `videoId: "..."` or `video_id = '...'`.
static SCRIPT_KV_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']?(?:videoId|video_id)["']?\s*[:=]\s*["']([A-Za-z0-9_-]{11})["']"#).unwrap());

/// Bare path segments without a recognizable host.
static PATH_SEGMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(?:embed|v|watch|shorts)/([A-Za-z0-9_-]{11})").unwrap());

/// Bare `v=` query parameter.
static QUERY_PARAM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]v=([A-Za-z0-9_-]{11})").unwrap());

/// An exactly-11-character YouTube video identifier.
///
/// The sole normalization target of the resolver: all URL shapes collapse to
/// this value and then to the canonical watch URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Validates and wraps a raw token. Must be exactly 11 characters from
    /// the URL-safe alphabet `[A-Za-z0-9_-]`.
    pub fn new(raw: &str) -> Option<Self> {
        if raw.len() == 11 && raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-') {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the canonical `https://www.youtube.com/watch?v=<id>` form.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts a video id from any supported URL shape.
///
/// The input is percent-decoded first so escaped variants resolve identically
/// to literal ones, then a fixed priority order of pattern rules is applied.
/// The first successful match wins; `None` if no rule matches.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let decoded = match urlencoding::decode(input) {
        Ok(cow) => cow.into_owned(),
        Err(_) => input.to_string(),
    };

    let rules: [&Regex; 4] = [
        &HOSTED_URL_REGEX,
        &SCRIPT_KV_REGEX,
        &PATH_SEGMENT_REGEX,
        &QUERY_PARAM_REGEX,
    ];

    for rule in rules {
        if let Some(caps) = rule.captures(&decoded) {
            if let Some(m) = caps.get(1) {
                return VideoId::new(m.as_str());
            }
        }
    }

    None
}

/// Collects every inline-script key/value id (`videoId`/`video_id`) in a
/// text blob, in match order. A script wiring up several players declares
/// one key per player, so single-match extraction is not enough here.
pub(crate) fn extract_script_video_ids(text: &str) -> Vec<VideoId> {
    SCRIPT_KV_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).and_then(|m| VideoId::new(m.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_validation() {
        assert!(VideoId::new("dQw4w9WgXcQ").is_some());
        assert!(VideoId::new("short").is_none());
        assert!(VideoId::new("twelve_chars").is_none());
        assert!(VideoId::new("bad.chars!!").is_none());
    }

    #[test]
    fn test_watch_url() {
        let id = VideoId::new("dQw4w9WgXcQ").unwrap();
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_all_shapes_collapse_to_same_id() {
        let shapes = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            r#"videoId: "dQw4w9WgXcQ""#,
            r#""video_id" = 'dQw4w9WgXcQ'"#,
        ];
        for shape in shapes {
            let id = extract_video_id(shape);
            assert_eq!(
                id.as_ref().map(VideoId::as_str),
                Some("dQw4w9WgXcQ"),
                "failed for shape: {shape}"
            );
        }
    }

    #[test]
    fn test_percent_encoded_input_decodes_first() {
        // "?v=" percent-encoded as "%3Fv%3D"
        let encoded = "https://www.youtube.com/watch%3Fv%3DdQw4w9WgXcQ";
        assert_eq!(extract_video_id(encoded).unwrap().as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_query_param_fallback() {
        assert_eq!(
            extract_video_id("https://example.com/player?autoplay=1&v=dQw4w9WgXcQ")
                .unwrap()
                .as_str(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_no_match() {
        assert!(extract_video_id("https://example.com/about").is_none());
        assert!(extract_video_id("").is_none());
        assert!(extract_video_id("watch?v=tooshort").is_none());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let input = "https://youtu.be/dQw4w9WgXcQ?t=42";
        assert_eq!(extract_video_id(input), extract_video_id(input));
    }
}

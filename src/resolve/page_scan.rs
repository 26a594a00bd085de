//! Embedded-video scanning for arbitrary third-party webpages.
//!
//! Applies five independent extraction strategies over the fetched document:
//!
//! 1. `<iframe>` sources pointing at a YouTube-family player
//! 2. inline `<script>` text (key/value ids and full embedded URLs)
//! 3. JSON-LD structured data (`VideoObject.embedUrl`)
//! 4. `og:video*` social preview metadata
//! 5. page-builder JSON string literals (`"youtube_url":"..."`), which need
//!    their escaped forward slashes undone before matching
//!
//! Candidates from all strategies are pooled and deduplicated by video id,
//! then rendered as canonical watch URLs.

use once_cell::sync::Lazy;
use regex::Regex;
use select::document::Document;
use select::predicate::Name;
use std::collections::BTreeSet;

use crate::core::config;
use crate::core::error::AppError;
use crate::resolve::video_id::{extract_script_video_ids, extract_video_id, VideoId};

/// Full YouTube-family URLs appearing in inline script text.
static SCRIPT_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://(?:www\.)?(?:youtube\.com|youtu\.be|youtube-nocookie\.com)/[^"'>\s]+"#).unwrap());

/// Page-builder (Elementor and friends) JSON literals with escaped slashes.
static BUILDER_JSON_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""youtube_url":"(https?:[^"]+youtube[^"]+)""#).unwrap());

/// Hosts whose URLs the scanner treats as YouTube-family embeds.
const EMBED_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "www.youtu.be",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

/// Returns true if the URL's host is a YouTube-family host.
fn is_youtube_family(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed
            .host_str()
            .map(|h| {
                let h = h.to_lowercase();
                EMBED_HOSTS.iter().any(|d| *d == h)
            })
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// Fetches a page and scans it for embedded YouTube videos.
///
/// Returns the set of canonical watch URLs found. Every network or parse
/// failure degrades to an empty set and is only visible in the logs — a
/// caller cannot distinguish "fetch failed" from "page has no video" by the
/// return value.
pub async fn scan_page(client: &reqwest::Client, page_url: &str) -> BTreeSet<String> {
    match fetch_page(client, page_url).await {
        Ok(html) => {
            let found = scan_html(&html);
            if found.is_empty() {
                log::info!("No embedded YouTube videos found on {}", page_url);
            } else {
                log::info!("Found {} embedded YouTube video(s) on {}", found.len(), page_url);
            }
            found
        }
        Err(e) => {
            log::warn!("Page scan failed for {}: {}", page_url, e);
            BTreeSet::new()
        }
    }
}

/// Fetches a page body with a bounded timeout.
async fn fetch_page(client: &reqwest::Client, page_url: &str) -> Result<String, AppError> {
    let resp = client
        .get(page_url)
        .timeout(config::network::page_fetch_timeout())
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(AppError::HttpStatus(resp.status()));
    }

    Ok(resp.text().await?)
}

/// Pure scan over already-fetched HTML. Split from [`scan_page`] so the five
/// strategies are testable without a live server.
pub fn scan_html(html: &str) -> BTreeSet<String> {
    let mut ids: BTreeSet<VideoId> = BTreeSet::new();
    let document = Document::from(html);

    // Strategy 1: iframe sources
    for iframe in document.find(Name("iframe")) {
        if let Some(src) = iframe.attr("src") {
            if is_youtube_family(src) {
                if let Some(id) = extract_video_id(src) {
                    ids.insert(id);
                }
            }
        }
    }

    // Strategy 2: inline script text — every key/value id, plus full URLs
    for script in document.find(Name("script")) {
        let text = script.text();
        if text.is_empty() {
            continue;
        }
        for id in extract_script_video_ids(&text) {
            ids.insert(id);
        }
        if let Some(id) = extract_video_id(&text) {
            ids.insert(id);
        }
        for m in SCRIPT_URL_REGEX.find_iter(&text) {
            if let Some(id) = extract_video_id(m.as_str()) {
                ids.insert(id);
            }
        }
    }

    // Strategy 3: JSON-LD VideoObject embedUrl
    for script in document.find(Name("script")) {
        if script.attr("type") != Some("application/ld+json") {
            continue;
        }
        let Ok(data) = serde_json::from_str::<serde_json::Value>(&script.text()) else {
            continue;
        };
        collect_json_ld_ids(&data, &mut ids);
    }

    // Strategy 4: og:video* meta tags
    for meta in document.find(Name("meta")) {
        let is_og_video = meta
            .attr("property")
            .map(|p| p.starts_with("og:video"))
            .unwrap_or(false);
        if !is_og_video {
            continue;
        }
        if let Some(content) = meta.attr("content") {
            if is_youtube_family(content) {
                if let Some(id) = extract_video_id(content) {
                    ids.insert(id);
                }
            }
        }
    }

    // Strategy 5: page-builder JSON string literals over the raw text
    for caps in BUILDER_JSON_REGEX.captures_iter(html) {
        if let Some(m) = caps.get(1) {
            let unescaped = m.as_str().replace("\\/", "/");
            if is_youtube_family(&unescaped) {
                if let Some(id) = extract_video_id(&unescaped) {
                    ids.insert(id);
                }
            }
        }
    }

    ids.into_iter().map(|id| id.watch_url()).collect()
}

/// Walks a JSON-LD value looking for `VideoObject` entries with a
/// YouTube-family `embedUrl`. Handles both single objects and `@graph`/array
/// wrappers, which page builders emit interchangeably.
fn collect_json_ld_ids(data: &serde_json::Value, ids: &mut BTreeSet<VideoId>) {
    match data {
        serde_json::Value::Object(map) => {
            let is_video_object = map.get("@type").and_then(|t| t.as_str()) == Some("VideoObject");
            if is_video_object {
                if let Some(embed_url) = map.get("embedUrl").and_then(|u| u.as_str()) {
                    if is_youtube_family(embed_url) {
                        if let Some(id) = extract_video_id(embed_url) {
                            ids.insert(id);
                        }
                    }
                }
            }
            if let Some(graph) = map.get("@graph") {
                collect_json_ld_ids(graph, ids);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_json_ld_ids(item, ids);
            }
        }
        _ => {}
    }
}

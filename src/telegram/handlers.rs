//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the bot. The handlers
//! are organized in a testable way, allowing integration tests to use the
//! same handler tree as production code.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, Message};

use crate::core::config;
use crate::core::error::AppError;
use crate::core::utils::{format_duration, sanitize_filename};
use crate::download::{cleanup, cookies, driver, tier, YtDlp};
use crate::resolve::{extract_video_id, resolve_to_watch_urls};
use crate::telegram::bot::Command;
use crate::telegram::session::{Expectation, OutputKind, SessionMap, SessionStatus};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub sessions: SessionMap,
    pub tool: Arc<YtDlp>,
    pub http: reqwest::Client,
}

impl HandlerDeps {
    pub fn new(sessions: SessionMap, tool: Arc<YtDlp>, http: reqwest::Client) -> Self {
        Self { sessions, tool, http }
    }
}

static GENERIC_URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s<>"']+"#).unwrap());

static SCHEMELESS_YT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|\s)((?:www\.|m\.|music\.)?(?:youtube\.com|youtu\.be)/[^\s<>"']+)"#).unwrap());

/// Pulls candidate links out of free-form text: anything with an explicit
/// scheme, plus schemeless YouTube links. Order preserved, capped at the
/// batch limit.
pub fn harvest_links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();

    for m in GENERIC_URL_REGEX.find_iter(text) {
        links.push(m.as_str().to_string());
    }
    for cap in SCHEMELESS_YT_REGEX.captures_iter(text) {
        let raw = cap[1].to_string();
        if !links.iter().any(|l| l.ends_with(&raw)) {
            links.push(raw);
        }
    }

    links.retain(|l| l.len() <= config::validation::MAX_URL_LENGTH);
    links.truncate(config::validation::MAX_BATCH_LINKS);
    links
}

/// Creates the main dispatcher schema for the bot.
///
/// The same schema is used in production and in integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                handle_command(&bot, &msg, cmd, &deps).await?;
                Ok(())
            }
        },
    ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let deps = deps.clone();
        async move {
            handle_message(&bot, &msg, &deps).await?;
            Ok(())
        }
    })
}

async fn handle_command(bot: &Bot, msg: &Message, cmd: Command, deps: &HandlerDeps) -> Result<(), AppError> {
    let chat = msg.chat.id;

    match cmd {
        Command::Start => {
            bot.send_message(
                chat,
                "Hi! I download YouTube videos, including videos embedded in other pages.\n\n\
                 /grab — send me links (or a .txt file of links) to download as video\n\
                 /audio — same, but you get the audio track as mp3\n\
                 /probe <link> — show video metadata without downloading\n\
                 /links <link> — export every watch URL found at a link as a .txt file\n\
                 /cookies — upload a youtube_cookies.txt for age-restricted videos\n\
                 /getcookies — get the installed cookie file back\n\
                 /cancel — stop the current batch",
            )
            .await?;
        }
        Command::Grab => {
            if deps.sessions.is_busy(chat) {
                bot.send_message(chat, "A batch is already running. Use /cancel to stop it first.")
                    .await?;
                return Ok(());
            }
            deps.sessions.expect_links(chat, OutputKind::Video);
            bot.send_message(
                chat,
                "Send me YouTube links (one or many), a page URL that embeds a video, \
                 or a .txt file with one link per line.",
            )
            .await?;
        }
        Command::Audio => {
            if deps.sessions.is_busy(chat) {
                bot.send_message(chat, "A batch is already running. Use /cancel to stop it first.")
                    .await?;
                return Ok(());
            }
            deps.sessions.expect_links(chat, OutputKind::Audio);
            bot.send_message(
                chat,
                "Send me YouTube links (one or many), a page URL that embeds a video, \
                 or a .txt file with one link per line. You will get mp3 audio back.",
            )
            .await?;
        }
        Command::Links(raw) => {
            let raw = raw.trim().to_string();
            if raw.is_empty() {
                bot.send_message(chat, "Usage: /links <link>").await?;
                return Ok(());
            }
            let urls = resolve_to_watch_urls(&deps.http, &raw).await;
            if urls.is_empty() {
                bot.send_message(chat, format!("No YouTube video found at {}", raw)).await?;
            } else {
                let mut content = urls.join("\n");
                content.push('\n');
                let file = InputFile::memory(content.into_bytes()).file_name("youtube_links.txt");
                bot.send_document(chat, file)
                    .caption(format!("{} watch URL(s) found", urls.len()))
                    .await?;
            }
        }
        Command::Probe(raw) => {
            let raw = raw.trim().to_string();
            if raw.is_empty() {
                bot.send_message(chat, "Usage: /probe <link>").await?;
                return Ok(());
            }
            match driver::probe(deps.tool.as_ref(), &deps.http, &raw).await {
                Ok(meta) => {
                    bot.send_message(
                        chat,
                        format!(
                            "Title: {}\nDuration: {}\nViews: {}",
                            meta.title,
                            format_duration(meta.duration_secs),
                            meta.view_count
                        ),
                    )
                    .await?;
                }
                Err(e) => {
                    log::warn!("Probe failed for {}: {}", raw, e);
                    bot.send_message(chat, format!("Could not probe that link: {}", e)).await?;
                }
            }
        }
        Command::Cookies => {
            deps.sessions.expect_cookie_file(chat);
            bot.send_message(
                chat,
                "Send me your youtube_cookies.txt (Netscape format, exported from your browser).",
            )
            .await?;
        }
        Command::Getcookies => match cookies::read_installed_cookies() {
            Ok(content) => {
                let file = InputFile::memory(content.into_bytes()).file_name("youtube_cookies.txt");
                bot.send_document(chat, file).await?;
            }
            Err(e) => {
                bot.send_message(chat, format!("{}", e)).await?;
            }
        },
        Command::Cancel => {
            if deps.sessions.cancel(chat) {
                bot.send_message(chat, "Stopping after the current download.").await?;
            } else {
                bot.send_message(chat, "Nothing is running.").await?;
            }
        }
    }

    Ok(())
}

/// Routes non-command messages based on the chat's pending expectation.
/// Plain text with links works without /grab too.
async fn handle_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), AppError> {
    let chat = msg.chat.id;

    match deps.sessions.take_expectation(chat) {
        Some(Expectation::CookieFile) => {
            handle_cookie_upload(bot, msg, deps).await?;
        }
        expectation => {
            // Plain links without a preceding /grab download as video
            let kind = match expectation {
                Some(Expectation::Links(kind)) => kind,
                _ => OutputKind::Video,
            };
            let links = collect_links_from_message(bot, msg, deps).await?;
            if links.is_empty() {
                log::debug!("No links found in message from {}", chat);
                return Ok(());
            }
            start_batch(bot, chat, deps, links, kind).await?;
        }
    }

    Ok(())
}

/// Extracts links from a text message or an attached `.txt` document.
async fn collect_links_from_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<Vec<String>, AppError> {
    if let Some(doc) = msg.document() {
        let is_txt = doc
            .file_name
            .as_deref()
            .map(|n| n.to_lowercase().ends_with(".txt"))
            .unwrap_or(false);
        if !is_txt {
            bot.send_message(msg.chat.id, "Invalid file type. Please upload a .txt file.")
                .await?;
            return Ok(Vec::new());
        }

        let bytes = fetch_telegram_file(bot, &deps.http, doc.file.id.clone()).await?;
        let content = String::from_utf8_lossy(&bytes);
        let links: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .flat_map(harvest_links)
            .take(config::validation::MAX_BATCH_LINKS)
            .collect();

        if links.is_empty() {
            bot.send_message(msg.chat.id, "No YouTube links found in the file.").await?;
        }
        return Ok(links);
    }

    Ok(msg.text().map(harvest_links).unwrap_or_default())
}

async fn handle_cookie_upload(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), AppError> {
    let chat = msg.chat.id;

    let Some(doc) = msg.document() else {
        bot.send_message(chat, "Please send the cookie file as a document.").await?;
        // Keep waiting for the actual file
        deps.sessions.expect_cookie_file(chat);
        return Ok(());
    };

    let bytes = fetch_telegram_file(bot, &deps.http, doc.file.id.clone()).await?;
    let content = String::from_utf8_lossy(&bytes);

    match cookies::install_cookies(&content) {
        Ok(path) => {
            bot.send_message(chat, format!("Cookies installed at {}.", path.display()))
                .await?;
        }
        Err(e) => {
            bot.send_message(chat, format!("Cookie file rejected: {}", e)).await?;
        }
    }

    Ok(())
}

/// Downloads a file from the Bot API into memory.
async fn fetch_telegram_file(bot: &Bot, http: &reqwest::Client, file_id: FileId) -> Result<Vec<u8>, AppError> {
    let file = bot.get_file(file_id).await?;

    let base = std::env::var("BOT_API_URL").unwrap_or_else(|_| "https://api.telegram.org".to_string());
    let url = format!("{}/file/bot{}/{}", base.trim_end_matches('/'), bot.token(), file.path);

    let response = http.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(AppError::HttpStatus(response.status()));
    }
    Ok(response.bytes().await?.to_vec())
}

/// Spawns the background batch task for a chat.
async fn start_batch(
    bot: &Bot,
    chat: ChatId,
    deps: &HandlerDeps,
    links: Vec<String>,
    kind: OutputKind,
) -> Result<(), AppError> {
    if deps.sessions.is_busy(chat) {
        bot.send_message(chat, "A batch is already running. Use /cancel to stop it first.")
            .await?;
        return Ok(());
    }

    let token = deps.sessions.begin_batch(chat);
    bot.send_message(chat, format!("Processing {} link(s)...", links.len())).await?;

    let bot = bot.clone();
    let deps = deps.clone();
    tokio::spawn(async move {
        process_links(&bot, chat, &deps, links, kind, token).await;
        deps.sessions.finish(chat);
    });

    Ok(())
}

/// File name for the relayed document: the sanitized title plus the actual
/// extension the tool produced.
fn outgoing_file_name(title: &str, file_path: &std::path::Path) -> String {
    let ext = file_path.extension().and_then(|e| e.to_str()).unwrap_or("mp4");
    let stem = sanitize_filename(title);
    if stem.is_empty() {
        format!("video.{}", ext)
    } else {
        format!("{}.{}", stem, ext)
    }
}

/// The batch worker: resolves each link, downloads that link's primary
/// video, and relays the file to the chat. Pages with several embeds yield
/// only their first resolved video; the rest are reported so the user can
/// fetch them via /links. Cancellation is polled between links, never
/// mid-download.
async fn process_links(
    bot: &Bot,
    chat: ChatId,
    deps: &HandlerDeps,
    links: Vec<String>,
    kind: OutputKind,
    cancel: tokio_util::sync::CancellationToken,
) {
    if let Err(e) = cleanup::cleanup_downloads_dir() {
        log::warn!("Pre-batch cleanup failed: {}", e);
    }

    let tiers = match kind {
        OutputKind::Video => tier::ladder(),
        OutputKind::Audio => tier::audio_ladder(),
    };

    let mut sent = 0usize;
    let mut failed = 0usize;
    let mut empty = 0usize;
    let mut cancelled = false;

    for link in &links {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        deps.sessions.set_status(chat, SessionStatus::Resolving);
        let watch_urls = resolve_to_watch_urls(&deps.http, link).await;

        let Some(watch_url) = watch_urls.first() else {
            empty += 1;
            let _ = bot
                .send_message(chat, format!("No YouTube video found at {}", link))
                .await;
            continue;
        };

        if watch_urls.len() > 1 {
            let _ = bot
                .send_message(
                    chat,
                    format!(
                        "Found {} videos at {}; downloading the first. Use /links {} to get them all.",
                        watch_urls.len(),
                        link,
                        link
                    ),
                )
                .await;
        }

        let Some(id) = extract_video_id(watch_url) else {
            log::warn!("Resolved URL without extractable id: {}", watch_url);
            failed += 1;
            continue;
        };

        deps.sessions.set_status(chat, SessionStatus::Downloading);
        let template = format!("{}/{}_{}.%(ext)s", config::download_folder_path(), id.as_str(), chat.0);

        match driver::download(deps.tool.as_ref(), &id, &template, tiers).await {
            Ok(outcome) => {
                let caption = format!(
                    "{}\nDuration: {}\nSource: {}\nMethod: {}",
                    outcome.title,
                    format_duration(outcome.duration_secs),
                    link,
                    outcome.method
                );
                let document = InputFile::file(outcome.file_path.clone())
                    .file_name(outgoing_file_name(&outcome.title, &outcome.file_path));
                let send = bot.send_document(chat, document).caption(caption).await;

                match send {
                    Ok(_) => sent += 1,
                    Err(e) => {
                        log::error!("Failed to relay {} to {}: {}", outcome.file_path.display(), chat, e);
                        failed += 1;
                        let _ = bot
                            .send_message(chat, format!("Downloaded {} but could not send it: {}", outcome.title, e))
                            .await;
                    }
                }

                if let Err(e) = std::fs::remove_file(&outcome.file_path) {
                    log::warn!("Could not remove {}: {}", outcome.file_path.display(), e);
                }
            }
            Err(e) => {
                failed += 1;
                let _ = bot
                    .send_message(chat, format!("Download failed for {}: {}", watch_url, e))
                    .await;
            }
        }
    }

    deps.sessions.set_status(chat, SessionStatus::Reporting);

    let summary = if cancelled {
        format!("Stopped. Sent: {}, failed: {}, nothing found: {}.", sent, failed, empty)
    } else {
        format!("Done. Sent: {}, failed: {}, nothing found: {}.", sent, failed, empty)
    };
    let _ = bot.send_message(chat, summary).await;

    if let Err(e) = cleanup::cleanup_downloads_dir() {
        log::warn!("Post-batch cleanup failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_harvest_links_mixed_text() {
        let text = "check https://youtu.be/dQw4w9WgXcQ and also\nyoutube.com/watch?v=abcdefghijk please";
        let links = harvest_links(text);
        assert_eq!(
            links,
            vec![
                "https://youtu.be/dQw4w9WgXcQ".to_string(),
                "youtube.com/watch?v=abcdefghijk".to_string(),
            ]
        );
    }

    #[test]
    fn test_harvest_links_third_party_page() {
        let links = harvest_links("look at http://blog.example.com/post/42");
        assert_eq!(links, vec!["http://blog.example.com/post/42".to_string()]);
    }

    #[test]
    fn test_harvest_links_none() {
        assert!(harvest_links("no links here").is_empty());
    }

    #[test]
    fn test_harvest_links_cap() {
        let text = (0..100)
            .map(|i| format!("https://example.com/{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(harvest_links(&text).len(), config::validation::MAX_BATCH_LINKS);
    }

    #[test]
    fn test_harvest_links_skips_oversized() {
        let long = format!("https://example.com/{}", "a".repeat(config::validation::MAX_URL_LENGTH));
        assert!(harvest_links(&long).is_empty());
    }

    #[test]
    fn test_outgoing_file_name_uses_sanitized_title() {
        let path = std::path::Path::new("downloads/dQw4w9WgXcQ_42.mp4");
        assert_eq!(
            outgoing_file_name("Never Gonna Give: You/Up", path),
            "Never_Gonna_Give_YouUp.mp4"
        );
    }

    #[test]
    fn test_outgoing_file_name_keeps_actual_extension() {
        let path = std::path::Path::new("downloads/dQw4w9WgXcQ_42.mp3");
        assert_eq!(outgoing_file_name("Some Song", path), "Some_Song.mp3");
    }

    #[test]
    fn test_outgoing_file_name_falls_back_for_unusable_title() {
        let path = std::path::Path::new("downloads/dQw4w9WgXcQ_42.webm");
        assert_eq!(outgoing_file_name("$(){}", path), "video.webm");
    }
}

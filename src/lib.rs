//! Tuberelay - Telegram bot that downloads YouTube videos and relays them
//! back as files.
//!
//! The crate is split along the pipeline: `resolve` turns arbitrary user
//! input into canonical watch URLs (scanning third-party pages for embedded
//! players when needed), `download` walks a fixed quality-fallback ladder
//! through yt-dlp, and `telegram` wires both into a bot with per-chat
//! sessions.

pub mod cli;
pub mod core;
pub mod download;
pub mod resolve;
pub mod telegram;

pub use core::{config, error::AppError, error::AppResult, init_logger, log_cookies_configuration};

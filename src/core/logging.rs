//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Cookies configuration validation and logging at startup

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;
use crate::download::cookies;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs cookies configuration at application startup
///
/// YouTube downloads frequently fail without valid cookies, so we surface the
/// state of the cookies file loudly before the first request comes in.
pub fn log_cookies_configuration() {
    let cookies_path = config::cookies_file_path();

    log::info!("🍪 Cookies configuration check");

    if std::path::Path::new(&cookies_path).exists() {
        if cookies::is_valid_cookie_file(&cookies_path) {
            log::info!("✅ YTDL_COOKIES_FILE: {} (valid Netscape format)", cookies_path);
        } else {
            log::warn!(
                "⚠️  YTDL_COOKIES_FILE: {} exists but is not a valid Netscape cookie file",
                cookies_path
            );
            log::warn!("   Upload a fresh export via /cookies in the bot chat");
        }
    } else {
        log::warn!("⚠️  Cookies file not found: {}", cookies_path);
        log::warn!("   YouTube downloads may fail for age-gated or rate-limited videos.");
        log::warn!("   Export cookies from a logged-in browser and upload them via /cookies.");
    }
}

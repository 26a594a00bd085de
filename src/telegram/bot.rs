//! Bot initialization and the command set.

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "I can:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "download videos from YouTube links or pages that embed them")]
    Grab,
    #[command(description = "download audio (mp3) from YouTube links or pages that embed them")]
    Audio,
    #[command(description = "show metadata for a link without downloading")]
    Probe(String),
    #[command(description = "export the watch URLs resolved from a link as a .txt file")]
    Links(String),
    #[command(description = "upload a youtube_cookies.txt for authenticated downloads")]
    Cookies,
    #[command(description = "download the currently installed cookie file")]
    Getcookies,
    #[command(description = "stop the current batch")]
    Cancel,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, network issues, etc.)
pub fn create_bot() -> anyhow::Result<Bot> {
    // Check if local Bot API server is configured
    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        Bot::from_env_with_client(ClientBuilder::new().timeout(config::network::timeout()).build()?).set_api_url(url)
    } else {
        Bot::from_env_with_client(ClientBuilder::new().timeout(config::network::timeout()).build()?)
    };

    Ok(bot)
}

/// Registers the command list in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "show the welcome message"),
        BotCommand::new("grab", "download videos from YouTube links or embedding pages"),
        BotCommand::new("audio", "download audio (mp3) from YouTube links or embedding pages"),
        BotCommand::new("probe", "show metadata for a link without downloading"),
        BotCommand::new("links", "export resolved watch URLs as a .txt file"),
        BotCommand::new("cookies", "upload a youtube_cookies.txt"),
        BotCommand::new("getcookies", "download the installed cookie file"),
        BotCommand::new("cancel", "stop the current batch"),
    ])
    .await?;

    Ok(())
}

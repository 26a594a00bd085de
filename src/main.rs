use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use tuberelay::cli::{Cli, Commands};
use tuberelay::core::utils::format_duration;
use tuberelay::core::web_server;
use tuberelay::download::{driver, ytdlp, YtDlp};
use tuberelay::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, SessionMap};
use tuberelay::{config, init_logger, log_cookies_configuration};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Catch panics from handler tasks so the process keeps serving
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    init_logger(&config::LOG_FILE_PATH)?;

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Some(Commands::Probe { url }) => probe(&url).await,
        Some(Commands::Ytdlp) => {
            ytdlp::print_ytdlp_version().await?;
            Ok(())
        }
        Some(Commands::Run) | None => run_bot().await,
    }
}

async fn probe(url: &str) -> Result<()> {
    ytdlp::print_ytdlp_version().await?;

    let client = reqwest::Client::builder().timeout(config::network::page_fetch_timeout()).build()?;
    let tool = YtDlp::from_env();

    let meta = driver::probe(&tool, &client, url).await?;
    println!("Title:    {}", meta.title);
    println!("Duration: {}", format_duration(meta.duration_secs));
    println!("Views:    {}", meta.view_count);
    Ok(())
}

async fn run_bot() -> Result<()> {
    log::info!("Starting tuberelay v{}", env!("CARGO_PKG_VERSION"));

    ytdlp::print_ytdlp_version().await?;
    log_cookies_configuration();

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    // Health endpoint for container orchestrators
    let health_port = *config::HEALTH_PORT;
    tokio::spawn(async move {
        if let Err(e) = web_server::start_health_server(health_port).await {
            log::error!("Health server failed: {}", e);
        }
    });

    let http = reqwest::Client::builder()
        .timeout(config::network::page_fetch_timeout())
        .build()?;

    let deps = HandlerDeps::new(SessionMap::new(), Arc::new(YtDlp::from_env()), http);
    let handler = schema(deps);

    log::info!("Bot is up, starting long polling");

    use teloxide::update_listeners::Polling;
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

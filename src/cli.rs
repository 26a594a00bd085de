use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tuberelay")]
#[command(author, version, about = "Telegram bot that downloads YouTube videos, including embedded ones", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot in normal mode
    Run,

    /// Resolve a link and print its video metadata without downloading
    Probe {
        /// YouTube link or a page URL that embeds a video
        url: String,
    },

    /// Check the yt-dlp installation and exit
    Ytdlp,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! Telegram bot integration and handlers

pub mod bot;
pub mod handlers;
pub mod session;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use session::{Expectation, OutputKind, SessionMap, SessionStatus};

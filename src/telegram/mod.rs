//! Telegram bot integration and handlers

pub mod bot;
pub mod client;
pub mod handlers;
pub mod relay;

pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use client::{ChannelClient, MessageRef, TelegramClient, VideoUpload};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use relay::{RelayContext, RelayRequest};

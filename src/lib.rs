//! vidrelay - Telegram bot that relays remote videos into a channel
//!
//! Links sent to the bot are downloaded with yt-dlp, split with ffmpeg when
//! they exceed the upload limit, and posted to the configured channel with a
//! thumbnail and live upload progress.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and process helpers
//! - `download`: external tools, duration probe, splitter, downloader and uploader
//! - `telegram`: Bot API client seam, dispatcher schema and the relay job

pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use download::{Downloader, MediaDuration, UploadReport, UploadRequest, Uploader};
pub use telegram::{ChannelClient, MessageRef, RelayContext};

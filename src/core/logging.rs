//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup report of the external tools and paths the relay depends on

use anyhow::Result;
use simplelog::*;
use std::fs::File;
use std::path::Path;

use crate::core::config;

/// Maps a level name from the environment to a filter. Unknown names fall back to Info.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;
    let level = parse_level(&config::LOG_LEVEL);

    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the relay configuration at application startup
///
/// Reports tool binaries, the cookie file the downloader will pick up,
/// the download folder and the target channel.
pub fn log_tools_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🔧 Relay configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("yt-dlp: {} (format: {})", *config::YTDL_BIN, *config::YTDL_FORMAT);
    log::info!("ffmpeg: {}, ffprobe: {}", *config::FFMPEG_BIN, *config::FFPROBE_BIN);

    let cookies = config::YTDL_COOKIES_FILE.as_str();
    if Path::new(cookies).exists() {
        log::info!("✅ Cookies file: {} (will be passed to yt-dlp)", cookies);
    } else {
        log::warn!("⚠️  Cookies file {} not found, downloads run without cookies", cookies);
    }

    log::info!("Download folder: {}", *config::DOWNLOAD_FOLDER);
    log::info!("Temp folder: {}", *config::TEMP_FILES_DIR);

    if *config::CHANNEL_ID == 0 {
        log::error!("❌ CHANNEL_ID is not set, uploads have nowhere to go");
    } else {
        log::info!("Target channel: {}", *config::CHANNEL_ID);
    }

    if config::AUTHORIZED_USERS.is_empty() {
        log::warn!("⚠️  AUTHORIZED_USERS is empty, anyone can submit links");
    } else {
        log::info!("Authorized users: {}", config::AUTHORIZED_USERS.len());
    }
    log::info!(
        "Split trigger: {} MiB, part size: {} MiB",
        *config::upload::SPLIT_TRIGGER_MB,
        *config::upload::SPLIT_PART_MAX_MB
    );
}

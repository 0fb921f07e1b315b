use anyhow::Result;
use dotenvy::dotenv;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::time::sleep;

use vidrelay::cli::{Cli, Commands};
use vidrelay::core::{config, init_logger, log_tools_configuration};
use vidrelay::download::split::split_if_needed;
use vidrelay::download::ytdlp::base_command;
use vidrelay::download::{probe_duration, Downloader, FfmpegTool, MediaDuration};
use vidrelay::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, RelayContext, TelegramClient};

/// Attempts to reach the Bot API before giving up at startup
const STARTUP_MAX_RETRIES: u32 = 60;

/// Main entry point
///
/// Parses CLI arguments and dispatches to the chosen subcommand; no subcommand
/// runs the bot.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present, before any config is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::Download { url, output, command }) => run_download(url, output, command).await,
        Some(Commands::Split { path, max_size_mb }) => run_split(path, max_size_mb).await,
        Some(Commands::Probe { path }) => run_probe(path).await,
    }
}

/// Downloads one URL and prints where the file landed
async fn run_download(url: String, output: String, command: Option<String>) -> Result<()> {
    let command =
        command.unwrap_or_else(|| base_command(&config::YTDL_BIN, &config::YTDL_FORMAT, &output, &url));

    let path = Downloader::from_config().download(&url, &command, &output).await;
    if !path.exists() {
        anyhow::bail!("Download produced no file (expected {})", path.display());
    }
    println!("{}", path.display());
    Ok(())
}

/// Splits a local file and prints the resulting parts
async fn run_split(path: String, max_size_mb: u64) -> Result<()> {
    let tool = FfmpegTool::from_config();
    let parts = split_if_needed(&tool, Path::new(&path), max_size_mb).await?;
    for part in parts {
        println!("{}", part.display());
    }
    Ok(())
}

/// Prints the duration of a local file, or "unknown"
async fn run_probe(path: String) -> Result<()> {
    let tool = FfmpegTool::from_config();
    match probe_duration(&tool, Path::new(&path)).await {
        MediaDuration::Known(secs) => println!("{:.3}", secs),
        MediaDuration::Unknown => println!("unknown"),
    }
    Ok(())
}

/// Runs the Telegram bot with long polling
async fn run_bot() -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");

    log_tools_configuration();

    let channel_id = config::require_channel_id(*config::CHANNEL_ID)?;
    log::info!("Uploads go to channel {}", channel_id);

    let bot = create_bot()?;

    // Retry if the Bot API is still initializing (local server restart)
    let bot_info = {
        let mut startup_retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    startup_retry += 1;
                    if startup_retry >= STARTUP_MAX_RETRIES {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} retries: {}",
                            startup_retry,
                            e
                        ));
                    }
                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                        startup_retry,
                        STARTUP_MAX_RETRIES,
                        e
                    );
                    sleep(Duration::from_secs(5)).await;
                }
            }
        }
    };
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let client = Arc::new(TelegramClient::new(bot.clone()));
    let relay = Arc::new(RelayContext::from_config(client));
    let handler = schema(HandlerDeps::new(relay, config::AUTHORIZED_USERS.clone()));

    log::info!("Bot initialization complete in {:.2}s", bot_init_start.elapsed().as_secs_f64());
    log::info!("Starting bot in long polling mode");

    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();
    Dispatcher::builder(bot, handler)
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

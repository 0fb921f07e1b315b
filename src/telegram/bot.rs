//! Bot initialization and command definitions

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Send a video link, optionally as `<url> | <name>`. Commands:")]
pub enum Command {
    #[command(description = "check that the bot is alive")]
    Start,
    #[command(description = "show usage")]
    Help,
}

/// Greeting sent on /start
pub fn start_text() -> String {
    "👋 Send me a video link and I will download it and post it to the channel.\n\
     Use `<url> | <name>` to set the file name and caption."
        .to_string()
}

/// Creates a Bot instance with custom or default API URL
///
/// The token comes from `BOT_TOKEN` (or `TELOXIDE_TOKEN`). `BOT_API_URL` points
/// the bot at a local Bot API server, which lifts the 50 MB upload cap.
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN is not set");
    }
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    let bot = if let Some(bot_api_url) = config::bot_api::get_url() {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        if config::bot_api::is_local_url(&bot_api_url) {
            log::info!("Local Bot API server in use, uploads up to 2 GB are allowed");
        } else {
            log::warn!("BOT_API_URL points at api.telegram.org, uploads are capped at 50 MB");
        }
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(vec![
        BotCommand::new("start", "check that the bot is alive"),
        BotCommand::new("help", "show usage"),
    ])
    .await?;

    Ok(())
}

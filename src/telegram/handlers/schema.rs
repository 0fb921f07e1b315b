//! Dispatcher schema and handler chain builders

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;
use teloxide::utils::command::BotCommands;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::{start_text, Command};
use crate::telegram::client::MessageRef;
use crate::telegram::relay::{is_authorized, RelayRequest};
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched first; any other text message is treated as a relay
/// request.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps))
}

fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

            let text = match cmd {
                Command::Start => start_text(),
                Command::Help => Command::descriptions().to_string(),
            };
            bot.send_message(msg.chat.id, text).await?;
            Ok(())
        },
    ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !text.starts_with('/')))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default();
                let user_id = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0);

                if !is_authorized(user_id, &deps.authorized_users) {
                    log::warn!("Refusing request from unauthorized user {}", user_id);
                    bot.send_message(msg.chat.id, "⛔ You are not authorized to use this bot.")
                        .await?;
                    return Ok(());
                }

                let request = match RelayRequest::parse(text) {
                    Ok(request) => request,
                    Err(e) => {
                        bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
                        return Ok(());
                    }
                };

                log::info!(
                    "Relay request from {}: {} ({})",
                    user_id,
                    request.display_name,
                    request.url
                );

                let relay = Arc::clone(&deps.relay);
                let origin = MessageRef::of(&msg);
                tokio::spawn(async move {
                    if let Err(e) = relay.run(request, origin).await {
                        log::error!("Relay job failed: {}", e);
                    }
                });

                Ok(())
            }
        })
}

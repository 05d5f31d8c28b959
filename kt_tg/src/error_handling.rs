use std::time::Duration;

use kt_core::Reply;
use teloxide::ApiError;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::keyboard::action_keyboard;

const NETWORK_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Send `reply` to `chat_id`, retrying once on rate limiting or a network error
///
/// Blocked bots and deactivated users are logged and treated as delivered.
pub async fn send_with_retry(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<(), RequestError> {
    match send_once(bot, chat_id, reply).await {
        Ok(()) => Ok(()),
        Err(RequestError::RetryAfter(seconds)) => {
            tracing::warn!(%chat_id, "Rate limited, retrying in {seconds:?}");
            tokio::time::sleep(seconds.duration()).await;
            send_once(bot, chat_id, reply).await
        }
        Err(RequestError::Network(err)) => {
            tracing::warn!(%chat_id, "Network error, retrying once: {err}");
            tokio::time::sleep(NETWORK_RETRY_DELAY).await;
            send_once(bot, chat_id, reply).await
        }
        Err(RequestError::Api(ApiError::BotBlocked)) => {
            tracing::warn!(%chat_id, "Bot was blocked by user");
            Ok(())
        }
        Err(RequestError::Api(ApiError::UserDeactivated)) => {
            tracing::warn!(%chat_id, "User is deactivated");
            Ok(())
        }
        Err(err) => {
            tracing::error!(%chat_id, "Unexpected error sending message: {err}");
            Err(err)
        }
    }
}

async fn send_once(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<(), RequestError> {
    let request = bot.send_message(chat_id, reply.text.clone());
    match &reply.action {
        Some(action) => request.reply_markup(action_keyboard(action)).await?,
        None => request.await?,
    };
    Ok(())
}

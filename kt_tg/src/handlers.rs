use std::sync::Arc;

use kt_core::Reply;
use kt_core::TradeDesk;
use kt_http::ExchangeGateway;
use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::error_handling::send_with_retry;
use crate::identity::callback_requester;
use crate::identity::message_requester;
use crate::identity::requester_chat;

/// Handle an incoming text message
pub async fn handle_message<G: ExchangeGateway + 'static>(bot: Bot, msg: Message, desk: Arc<TradeDesk<G>>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let replies = desk.handle(message_requester(&msg), text).await;
    deliver(&bot, msg.chat.id, &replies).await
}

/// Handle an inline button press; its data is a command and takes the same path as typed text
pub async fn handle_callback<G: ExchangeGateway + 'static>(bot: Bot, query: CallbackQuery, desk: Arc<TradeDesk<G>>) -> ResponseResult<()> {
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(requester) = callback_requester(&query) else {
        tracing::warn!(user_id = %query.from.id, "Callback from user id outside the supported range");
        return Ok(());
    };
    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };

    let replies = desk.handle(requester, data).await;
    deliver(&bot, requester_chat(requester), &replies).await
}

async fn deliver(bot: &Bot, chat_id: ChatId, replies: &[Reply]) -> ResponseResult<()> {
    for reply in replies {
        send_with_retry(bot, chat_id, reply).await?;
    }
    Ok(())
}

use kt_core::Notification;
use kt_core::Reply;
use teloxide::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error_handling::send_with_retry;
use crate::identity::requester_chat;

/// Deliver order monitor notifications until the monitor goes away
pub async fn forward_notifications(bot: Bot, mut notify_rx: UnboundedReceiver<Notification>) {
    while let Some(notification) = notify_rx.recv().await {
        let chat_id = requester_chat(notification.recipient);
        if let Err(err) = send_with_retry(&bot, chat_id, &Reply::text(notification.text)).await {
            tracing::error!(%chat_id, "Failed to deliver notification: {err}");
        }
    }

    tracing::info!("Notification channel closed");
}

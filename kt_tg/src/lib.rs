//! # kt_tg
//!
//! Telegram transport for the Kraken order desk: routes chat messages and
//! button presses to [`kt_core::TradeDesk`] and delivers replies and order
//! notifications

pub mod bot_commands;
pub mod error_handling;
pub mod handlers;
pub mod identity;
pub mod keyboard;
pub mod notifier;

pub use bot_commands::MenuCommand;
pub use error_handling::send_with_retry;
pub use handlers::handle_callback;
pub use handlers::handle_message;
pub use notifier::forward_notifications;

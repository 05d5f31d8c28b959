//! # kt_core
//!
//! Order lifecycle and trade-command interpreter: parses chat commands into
//! exchange requests, places limit orders, and watches placed orders until the
//! exchange reports them closed or canceled.

pub mod command;
pub mod desk;
pub mod errors;
pub mod handle;
pub mod interpreter;
pub mod monitor;
pub mod notification;
pub mod settings;
pub mod submission;

#[cfg(test)]
mod mock;

pub use command::Command;
pub use command::CommandError;
pub use desk::Reply;
pub use desk::ReplyAction;
pub use desk::TradeDesk;
pub use errors::Anomaly;
pub use errors::DeskError;
pub use handle::MonitorError;
pub use handle::MonitorHandle;
pub use monitor::OrderMonitor;
pub use monitor::reconcile_open_orders;
pub use notification::Notification;
pub use settings::Settings;
pub use settings::SettingsError;

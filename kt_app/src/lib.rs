//! # kt_app
//!
//! Startup plumbing for the order desk binaries: configuration, logging and
//! command-line handling

pub mod cli;
pub mod config_loader;
pub mod tracing_setup;

pub use config_loader::BotConfig;
pub use config_loader::ConfigLoadError;
pub use config_loader::load_bot_config;

use std::path::Path;
use std::path::PathBuf;

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use config::FileFormat;
use config::builder::DefaultState;
use kt_core::Settings;
use kt_core::SettingsError;
use serde::Deserialize;
use thiserror::Error;

/// Prefix of environment overrides, e.g. `KT_USER_ID`, `KT_CHECK_TRADE_TIME`
pub const ENV_PREFIX: &str = "KT";

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Failed to read configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Settings(#[from] SettingsError),
}

/// Everything the bot binary needs at startup
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    /// Telegram bot token; `TELOXIDE_TOKEN` is used when absent
    #[serde(default)]
    pub bot_token: Option<String>,

    #[serde(flatten)]
    pub settings: Settings,

    /// Two lines: API key, then base64 API secret
    #[serde(default = "default_kraken_key_file")]
    pub kraken_key_file: PathBuf,

    #[serde(default)]
    pub kraken_base_url: Option<String>,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_kraken_key_file() -> PathBuf {
    PathBuf::from("kraken.key")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Load `path` with `KT_*` environment overrides on top
pub fn load_bot_config<P: AsRef<Path>>(path: P) -> Result<BotConfig, ConfigLoadError> {
    finish(Config::builder().add_source(File::from(path.as_ref())))
}

/// Same as [`load_bot_config`] for TOML held in memory
pub fn parse_bot_config(toml: &str) -> Result<BotConfig, ConfigLoadError> {
    finish(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<BotConfig, ConfigLoadError> {
    let config = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true)).build()?;
    let mut bot_config: BotConfig = config.try_deserialize()?;
    bot_config.settings = bot_config.settings.validated()?;
    Ok(bot_config)
}

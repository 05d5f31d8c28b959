use std::time::Duration;

use kt_types::Requester;
use serde::Deserialize;
use thiserror::Error;

/// Read-only account configuration consumed by the desk and the monitor
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// The only Telegram user allowed to issue commands. Orders rediscovered at
    /// startup report to this user as well.
    pub user_id: i64,

    /// Settlement currency every trade is priced in, e.g. "EUR"
    #[serde(default = "default_trade_to_currency")]
    pub trade_to_currency: String,

    /// Watch placed orders until they close
    #[serde(default = "default_check_trade")]
    pub check_trade: bool,

    /// Seconds between two polls of the same order
    #[serde(default = "default_check_trade_time")]
    pub check_trade_time: u64,
}

fn default_trade_to_currency() -> String {
    "EUR".to_string()
}

fn default_check_trade() -> bool {
    true
}

fn default_check_trade_time() -> u64 {
    30
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("trade_to_currency must be a non-empty alphanumeric currency code, got '{0}'")]
    InvalidQuoteCurrency(String),

    #[error("check_trade_time must be at least one second")]
    ZeroPollInterval,
}

impl Settings {
    pub fn new(user_id: i64, trade_to_currency: impl Into<String>) -> Self {
        Self {
            user_id,
            trade_to_currency: trade_to_currency.into(),
            check_trade: default_check_trade(),
            check_trade_time: default_check_trade_time(),
        }
    }

    /// Normalise the quote currency to upper case and reject unusable values
    pub fn validated(mut self) -> Result<Self, SettingsError> {
        let quote = self.trade_to_currency.trim().to_uppercase();
        if quote.is_empty() || !quote.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(SettingsError::InvalidQuoteCurrency(self.trade_to_currency));
        }
        if self.check_trade_time == 0 {
            return Err(SettingsError::ZeroPollInterval);
        }
        self.trade_to_currency = quote;
        Ok(self)
    }

    pub fn owner(&self) -> Requester {
        Requester(self.user_id)
    }

    pub fn is_authorized(&self, requester: Requester) -> bool {
        requester == self.owner()
    }

    pub fn quote(&self) -> &str {
        &self.trade_to_currency
    }

    /// Kraken asset code of the quote currency, e.g. `ZEUR`
    pub fn quote_asset(&self) -> String {
        format!("Z{}", self.trade_to_currency)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.check_trade_time)
    }
}

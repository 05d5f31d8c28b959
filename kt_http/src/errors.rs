use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Network fault talking to the exchange; never conflated with a business error
    #[error("Kraken unreachable: {0}")]
    Unreachable(String),

    /// Error list reported by the exchange, relayed verbatim
    #[error("{}", .0.join("\n"))]
    Exchange(Vec<String>),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

impl GatewayError {
    /// Single exchange-reported error, e.g. `EOrder:Unknown order`
    pub fn exchange(message: impl Into<String>) -> Self {
        GatewayError::Exchange(vec![message.into()])
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Unreachable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

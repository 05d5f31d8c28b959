use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;

/// Uniform request/response contract over the exchange API
///
/// Implementations return the `result` payload on success. A non-empty
/// exchange error list becomes [`GatewayError::Exchange`], a network fault
/// becomes [`GatewayError::Unreachable`]. Nothing is retried here.
///
/// [`GatewayError::Exchange`]: crate::GatewayError::Exchange
/// [`GatewayError::Unreachable`]: crate::GatewayError::Unreachable
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Unauthenticated endpoint such as `Ticker`
    async fn query_public(&self, method: &str, params: &[(&str, String)]) -> Result<Value>;

    /// Signed endpoint such as `Balance` or `AddOrder`
    async fn query_private(&self, method: &str, params: &[(&str, String)]) -> Result<Value>;
}

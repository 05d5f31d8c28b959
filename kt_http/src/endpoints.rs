use async_trait::async_trait;
use kt_types::OrderRequest;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::Result;
use crate::gateway::ExchangeGateway;
use crate::models::AddOrderResult;
use crate::models::Balances;
use crate::models::CancelOrderResult;
use crate::models::OpenOrders;
use crate::models::OrderInfos;
use crate::models::Tickers;
use crate::models::TradeBalance;

/// Typed Kraken endpoints on top of any [`ExchangeGateway`]
#[async_trait]
pub trait KrakenEndpoints: ExchangeGateway {
    async fn balance(&self) -> Result<Balances> {
        decode(self.query_private("Balance", &[]).await?)
    }

    /// Trade balance expressed in `asset`, e.g. `ZEUR`
    async fn trade_balance(&self, asset: &str) -> Result<TradeBalance> {
        decode(self.query_private("TradeBalance", &[("asset", asset.to_string())]).await?)
    }

    async fn open_orders(&self) -> Result<OpenOrders> {
        decode(self.query_private("OpenOrders", &[]).await?)
    }

    async fn query_orders(&self, txid: &str) -> Result<OrderInfos> {
        decode(self.query_private("QueryOrders", &[("txid", txid.to_string())]).await?)
    }

    async fn add_order(&self, request: &OrderRequest) -> Result<AddOrderResult> {
        let params = request.params();
        decode(self.query_private("AddOrder", &params).await?)
    }

    async fn cancel_order(&self, txid: &str) -> Result<CancelOrderResult> {
        decode(self.query_private("CancelOrder", &[("txid", txid.to_string())]).await?)
    }

    /// Last trade prices for a comma-joined list of pairs
    async fn ticker(&self, pairs: &[String]) -> Result<Tickers> {
        decode(self.query_public("Ticker", &[("pair", pairs.join(","))]).await?)
    }
}

impl<G: ExchangeGateway> KrakenEndpoints for G {}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use kt_types::FixedPoint;
    use kt_types::OrderStatus;
    use kt_types::Side;
    use serde_json::json;

    use super::*;
    use crate::errors::GatewayError;

    /// Replays one canned payload and records what was asked
    struct CannedGateway {
        payload: Value,
        seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl CannedGateway {
        fn new(payload: Value) -> Self {
            Self { payload, seen: Mutex::new(Vec::new()) }
        }

        fn record(&self, method: &str, params: &[(&str, String)]) {
            let params = params.iter().map(|(key, value)| (key.to_string(), value.clone())).collect();
            self.seen.lock().unwrap().push((method.to_string(), params));
        }
    }

    #[async_trait]
    impl ExchangeGateway for CannedGateway {
        async fn query_public(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
            self.record(method, params);
            Ok(self.payload.clone())
        }

        async fn query_private(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
            self.record(method, params);
            Ok(self.payload.clone())
        }
    }

    #[tokio::test]
    async fn test_balance() {
        let gateway = CannedGateway::new(json!({"ZEUR": "100.5000", "XXBT": "0.2500000000"}));
        let balances = gateway.balance().await.unwrap();

        assert_eq!(balances["XXBT"], FixedPoint(25_000_000));
        assert_eq!(gateway.seen.lock().unwrap()[0].0, "Balance");
    }

    #[tokio::test]
    async fn test_query_orders_sends_txid() {
        let gateway = CannedGateway::new(json!({"OABC": {"status": "closed", "descr": {"order": "sell 1.0 XBTEUR @ limit 1.0"}}}));
        let orders = gateway.query_orders("OABC").await.unwrap();

        assert_eq!(orders["OABC"].status, OrderStatus::Closed);
        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen[0], ("QueryOrders".to_string(), vec![("txid".to_string(), "OABC".to_string())]));
    }

    #[tokio::test]
    async fn test_add_order_sends_request_params() {
        let gateway = CannedGateway::new(json!({"txid": ["ONEW"]}));
        let request = OrderRequest::limit(Side::Sell, "XXBT", "EUR", "30000".parse().unwrap(), "0.5".parse().unwrap());

        let result = gateway.add_order(&request).await.unwrap();
        assert_eq!(result.txid, vec!["ONEW".to_string()]);

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen[0].0, "AddOrder");
        assert!(seen[0].1.contains(&("volume".to_string(), "0.50000000".to_string())));
        assert!(seen[0].1.contains(&("pair".to_string(), "XXBTZEUR".to_string())));
    }

    #[tokio::test]
    async fn test_ticker_joins_pairs() {
        let gateway = CannedGateway::new(json!({"XXBTZEUR": {"c": ["30000.0", "1"]}}));
        gateway.ticker(&["XXBTZEUR".to_string(), "XETHZEUR".to_string()]).await.unwrap();

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen[0], ("Ticker".to_string(), vec![("pair".to_string(), "XXBTZEUR,XETHZEUR".to_string())]));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_json_error() {
        let gateway = CannedGateway::new(json!({"tb": "not a number"}));
        let result = gateway.trade_balance("ZEUR").await;
        assert!(matches!(result, Err(GatewayError::JsonError(_))));
    }
}

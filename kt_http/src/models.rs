// Kraken response payloads, decoded straight into fixed-point values.
// Amounts arrive as JSON strings and are parsed by kt_types' FixedPoint deserializer.

use std::collections::BTreeMap;

use kt_types::FixedPoint;
use kt_types::OrderStatus;
use kt_types::serde_helpers::deserialize_first_fixed_point;
use serde::Deserialize;

/// `Balance`: asset code to held quantity
pub type Balances = BTreeMap<String, FixedPoint>;

/// `TradeBalance` for one asset
#[derive(Debug, Clone, Deserialize)]
pub struct TradeBalance {
    /// Combined balance of all equity currencies
    #[serde(rename = "tb")]
    pub trade_balance: FixedPoint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderDescription {
    /// Human-readable summary, e.g. "buy 0.25000000 XBTEUR @ limit 5000.0"
    pub order: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderInfo {
    pub status: OrderStatus,
    pub descr: OrderDescription,
    /// Volume filled so far
    #[serde(default)]
    pub vol_exec: Option<FixedPoint>,
}

/// `QueryOrders`: txid to order
pub type OrderInfos = BTreeMap<String, OrderInfo>;

#[derive(Debug, Clone, Deserialize)]
pub struct OpenOrders {
    #[serde(default)]
    pub open: BTreeMap<String, OrderInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddOrderResult {
    #[serde(default)]
    pub txid: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrderResult {
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerInfo {
    /// `c` is `[price, lot volume]` of the last trade
    #[serde(rename = "c", deserialize_with = "deserialize_first_fixed_point")]
    pub last_trade_price: FixedPoint,
}

/// `Ticker`: pair name to ticker
pub type Tickers = BTreeMap<String, TickerInfo>;

use std::fmt;

use serde::Deserialize;

use crate::fixed_point::FixedPoint;

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Parse the exact lowercase keyword used on the command line
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only limit orders are placed by the desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "limit",
        }
    }
}

/// Kraken pair name for a base currency settled in the quote currency,
/// e.g. `XXBT` + `EUR` gives `XXBTZEUR`
pub fn pair_name(base: &str, quote: &str) -> String {
    format!("{base}Z{quote}")
}

/// Validated order ready for submission
///
/// Volume is always in base-currency units and resolved before the request is
/// built; nothing mutates a request afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    side: Side,
    base: String,
    quote: String,
    price: FixedPoint,
    order_type: OrderType,
    volume: FixedPoint,
}

impl OrderRequest {
    pub fn limit(side: Side, base: impl Into<String>, quote: impl Into<String>, price: FixedPoint, volume: FixedPoint) -> Self {
        Self { side, base: base.into(), quote: quote.into(), price, order_type: OrderType::Limit, volume }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> FixedPoint {
        self.price
    }

    pub fn volume(&self) -> FixedPoint {
        self.volume
    }

    pub fn pair(&self) -> String {
        pair_name(&self.base, &self.quote)
    }

    /// `AddOrder` form parameters; volume is sent with its full 8 digits
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("type", self.side.as_str().to_string()),
            ("pair", self.pair()),
            ("price", self.price.trimmed()),
            ("ordertype", self.order_type.as_str().to_string()),
            ("volume", self.volume.to_string()),
        ]
    }
}

/// Order status as reported by `QueryOrders` / `OpenOrders`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Open,
    Closed,
    Canceled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Closed and canceled orders never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Closed | OrderStatus::Canceled)
    }
}

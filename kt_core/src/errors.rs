use kt_http::GatewayError;
use kt_types::FixedPoint;
use kt_types::FixedPointError;
use thiserror::Error;

use crate::command::CommandError;
use crate::handle::MonitorError;

/// Everything that can end a command; the display text is what the requester sees
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Access denied")]
    AccessDenied,

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Number(#[from] FixedPointError),

    #[error("Order volume must be positive, got {}", .0.trimmed())]
    NonPositiveVolume(FixedPoint),

    #[error("No {0} balance to sell")]
    NothingToSell(String),

    #[error(transparent)]
    Anomaly(#[from] Anomaly),

    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// The exchange accepted an action but a follow-up read cannot confirm it
#[derive(Error, Debug)]
pub enum Anomaly {
    #[error("Undefined state: no error and no TXID")]
    MissingTxid,

    #[error("Undefined state: order {txid} was accepted but could not be queried: {source}")]
    Unconfirmed { txid: String, source: GatewayError },

    #[error("No order with TXID {txid}")]
    NotFound { txid: String },
}

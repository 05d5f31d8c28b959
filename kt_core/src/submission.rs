use kt_http::ExchangeGateway;
use kt_http::KrakenEndpoints;
use kt_types::OrderRequest;
use kt_types::Requester;
use kt_types::trim_description;

use crate::errors::Anomaly;
use crate::errors::DeskError;
use crate::handle::MonitorHandle;

/// Whether a placed order is being watched until it closes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tracking {
    Watched,
    Disabled,
    Unavailable(String),
}

/// An order the exchange accepted and confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub txid: String,
    /// Exchange description with numbers trimmed
    pub description: String,
    pub tracking: Tracking,
}

impl PlacedOrder {
    pub fn confirmation(&self) -> String {
        let mut text = format!("Order placed: {}\n{}", self.txid, self.description);
        if let Tracking::Unavailable(reason) = &self.tracking {
            text.push_str(&format!("\nNot watching this order: {reason}"));
        }
        text
    }
}

/// Submit `request`, read the order back for its description, then hand it to
/// the monitor when one is given
pub async fn place_order<G: ExchangeGateway>(
    gateway: &G,
    monitor: Option<&MonitorHandle>,
    requester: Requester,
    request: &OrderRequest,
) -> Result<PlacedOrder, DeskError> {
    let added = gateway.add_order(request).await?;
    let Some(txid) = added.txid.into_iter().next() else {
        tracing::error!(pair = %request.pair(), "Order accepted without a transaction id");
        return Err(Anomaly::MissingTxid.into());
    };
    tracing::info!(%txid, pair = %request.pair(), side = %request.side(), %requester, "Order accepted");

    let mut orders = match gateway.query_orders(&txid).await {
        Ok(orders) => orders,
        Err(source) => {
            tracing::error!(%txid, error = %source, "Accepted order could not be queried");
            return Err(Anomaly::Unconfirmed { txid, source }.into());
        }
    };
    let Some(order) = orders.remove(&txid) else {
        return Err(Anomaly::NotFound { txid }.into());
    };

    let tracking = match monitor {
        None => Tracking::Disabled,
        Some(monitor) => match monitor.watch(txid.clone(), requester) {
            Ok(()) => Tracking::Watched,
            Err(err) => {
                tracing::error!(%txid, error = %err, "Could not watch placed order");
                Tracking::Unavailable(err.to_string())
            }
        },
    };

    Ok(PlacedOrder { description: trim_description(&order.descr.order), txid, tracking })
}

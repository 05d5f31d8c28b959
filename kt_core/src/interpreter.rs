use kt_http::ExchangeGateway;
use kt_http::KrakenEndpoints;
use kt_types::FixedPoint;
use kt_types::OrderRequest;
use kt_types::Side;

use crate::command::TradeArgs;
use crate::command::VolumeArg;
use crate::errors::DeskError;
use crate::settings::Settings;

/// Turn parsed trade arguments into a limit order, reading balances from the
/// exchange when the volume was left out
pub async fn resolve_order<G: ExchangeGateway>(gateway: &G, settings: &Settings, args: &TradeArgs) -> Result<OrderRequest, DeskError> {
    let volume = match args.volume {
        VolumeArg::Volume(volume) => volume,
        VolumeArg::Amount(amount) => amount.checked_div(args.price)?,
        VolumeArg::Auto => auto_volume(gateway, settings, args).await?,
    };

    if !volume.is_positive() {
        return Err(DeskError::NonPositiveVolume(volume));
    }

    let request = OrderRequest::limit(args.side, args.currency.as_str(), settings.quote(), args.price, volume);
    tracing::debug!(pair = %request.pair(), side = %request.side(), price = %request.price(), volume = %request.volume(), "Resolved order");
    Ok(request)
}

/// Buys spend the whole quote trade balance, sells offload the whole holding
async fn auto_volume<G: ExchangeGateway>(gateway: &G, settings: &Settings, args: &TradeArgs) -> Result<FixedPoint, DeskError> {
    match args.side {
        Side::Buy => {
            let balance = gateway.trade_balance(&settings.quote_asset()).await?;
            Ok(balance.trade_balance.checked_div(args.price)?)
        }
        Side::Sell => {
            let balances = gateway.balance().await?;
            match balances.get(&args.currency) {
                Some(held) if held.is_positive() => Ok(*held),
                _ => Err(DeskError::NothingToSell(args.currency.clone())),
            }
        }
    }
}

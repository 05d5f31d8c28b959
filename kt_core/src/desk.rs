use std::sync::Arc;

use kt_http::ExchangeGateway;
use kt_http::KrakenEndpoints;
use kt_types::FixedPoint;
use kt_types::Requester;
use kt_types::pair_name;
use kt_types::trim_description;

use crate::command::Command;
use crate::command::OrdersAction;
use crate::command::TradeArgs;
use crate::command::help_text;
use crate::errors::DeskError;
use crate::handle::MonitorHandle;
use crate::interpreter::resolve_order;
use crate::settings::Settings;
use crate::submission::place_order;

/// Follow-up command offered next to a reply, rendered as a button by chat frontends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyAction {
    pub label: String,
    pub command: String,
}

/// One outbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub action: Option<ReplyAction>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), action: None }
    }

    pub fn with_action(mut self, label: impl Into<String>, command: impl Into<String>) -> Self {
        self.action = Some(ReplyAction { label: label.into(), command: command.into() });
        self
    }
}

/// Authorizes requesters and executes their commands against the exchange
pub struct TradeDesk<G> {
    gateway: Arc<G>,
    settings: Arc<Settings>,
    monitor: Option<MonitorHandle>,
}

impl<G: ExchangeGateway> TradeDesk<G> {
    /// `monitor` is only consulted when `settings.check_trade` is set
    pub fn new(gateway: Arc<G>, settings: Arc<Settings>, monitor: Option<MonitorHandle>) -> Self {
        Self { gateway, settings, monitor }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle one chat message. Every outcome, failures included, is turned
    /// into replies; unauthorized requesters get "Access denied" and nothing
    /// reaches the exchange.
    pub async fn handle(&self, requester: Requester, text: &str) -> Vec<Reply> {
        if !self.settings.is_authorized(requester) {
            tracing::warn!(%requester, "Rejected command from unauthorized user");
            return vec![Reply::text(DeskError::AccessDenied.to_string())];
        }

        let command = match Command::parse(text, self.settings.quote()) {
            Ok(command) => command,
            Err(err) => {
                tracing::debug!(%requester, %text, error = %err, "Unparseable command");
                return vec![Reply::text(err.to_string())];
            }
        };
        tracing::info!(%requester, ?command, "Handling command");

        let mut replies = Vec::new();
        if let Err(err) = self.execute(requester, command, &mut replies).await {
            tracing::warn!(%requester, error = %err, "Command failed");
            replies.push(Reply::text(err.to_string()));
        }
        replies
    }

    /// Run an already authorized command. Replies produced before a failure stay in `replies`.
    pub async fn execute(&self, requester: Requester, command: Command, replies: &mut Vec<Reply>) -> Result<(), DeskError> {
        match command {
            Command::Help => replies.push(Reply::text(help_text(self.settings.quote()))),
            Command::Balance { available } => replies.push(self.balance(available).await?),
            Command::Trade(args) => replies.push(self.trade(requester, &args).await?),
            Command::Orders(OrdersAction::List) => self.list_orders(replies).await?,
            Command::Orders(OrdersAction::CloseAll) => self.close_all(replies).await?,
            Command::Orders(OrdersAction::Close { txid }) => replies.push(self.close(&txid).await?),
            Command::Price { currencies } => replies.push(self.price(&currencies).await?),
            Command::Value { currency } => replies.push(self.value(currency.as_deref()).await?),
        }
        Ok(())
    }

    async fn balance(&self, available: bool) -> Result<Reply, DeskError> {
        if available {
            let balance = self.gateway.trade_balance(&self.settings.quote_asset()).await?;
            return Ok(Reply::text(format!("{}: {}", self.settings.quote(), balance.trade_balance.trimmed())));
        }

        let balances = self.gateway.balance().await?;
        if balances.is_empty() {
            return Ok(Reply::text("No funds"));
        }
        let lines: Vec<String> = balances.iter().map(|(asset, amount)| format!("{asset}: {}", amount.trimmed())).collect();
        Ok(Reply::text(lines.join("\n")))
    }

    async fn trade(&self, requester: Requester, args: &TradeArgs) -> Result<Reply, DeskError> {
        let request = resolve_order(self.gateway.as_ref(), &self.settings, args).await?;
        let monitor = self.monitor.as_ref().filter(|_| self.settings.check_trade);
        let placed = place_order(self.gateway.as_ref(), monitor, requester, &request).await?;
        Ok(Reply::text(placed.confirmation()))
    }

    /// One message per open order, each offering a Close button
    async fn list_orders(&self, replies: &mut Vec<Reply>) -> Result<(), DeskError> {
        let open = self.gateway.open_orders().await?;
        if open.open.is_empty() {
            replies.push(Reply::text("No open orders"));
            return Ok(());
        }

        for (txid, order) in &open.open {
            let text = format!("{txid}\n{}", trim_description(&order.descr.order));
            replies.push(Reply::text(text).with_action("Close", format!("/orders close {txid}")));
        }
        Ok(())
    }

    async fn close_all(&self, replies: &mut Vec<Reply>) -> Result<(), DeskError> {
        let open = self.gateway.open_orders().await?;
        if open.open.is_empty() {
            replies.push(Reply::text("No open orders"));
            return Ok(());
        }

        for txid in open.open.keys() {
            replies.push(self.close(txid).await?);
        }
        Ok(())
    }

    async fn close(&self, txid: &str) -> Result<Reply, DeskError> {
        let canceled = self.gateway.cancel_order(txid).await?;
        tracing::info!(%txid, count = canceled.count, "Order canceled");
        Ok(Reply::text(format!("Order closed:\n{txid}")))
    }

    async fn price(&self, currencies: &[String]) -> Result<Reply, DeskError> {
        let quote = self.settings.quote();
        let pairs: Vec<String> = currencies.iter().map(|currency| pair_name(currency, quote)).collect();
        let tickers = self.gateway.ticker(&pairs).await?;

        let suffix = format!("Z{quote}");
        let lines: Vec<String> = tickers
            .iter()
            .map(|(pair, ticker)| {
                let currency = pair.strip_suffix(suffix.as_str()).unwrap_or(pair);
                format!("{currency}: {} {quote}", ticker.last_trade_price.trimmed())
            })
            .collect();
        if lines.is_empty() {
            return Ok(Reply::text(format!("No prices for {}", currencies.join(", "))));
        }
        Ok(Reply::text(lines.join("\n")))
    }

    /// Worth of all holdings at the last trade price. A held `currency` is valued
    /// alone; one that is not held falls back to the overall figure.
    async fn value(&self, currency: Option<&str>) -> Result<Reply, DeskError> {
        let quote = self.settings.quote();
        let balances = self.gateway.balance().await?;

        let wanted = currency.filter(|wanted| !wanted.ends_with(quote) && balances.contains_key(*wanted));
        let label = wanted.unwrap_or("Overall");
        let pairs: Vec<String> = balances
            .keys()
            .filter(|asset| !asset.ends_with(quote))
            .filter(|asset| wanted.is_none_or(|wanted| asset.as_str() == wanted))
            .map(|asset| pair_name(asset, quote))
            .collect();

        let mut total = FixedPoint::ZERO;
        if !pairs.is_empty() {
            let tickers = self.gateway.ticker(&pairs).await?;
            let suffix = format!("Z{quote}");
            for (pair, ticker) in &tickers {
                let asset = pair.strip_suffix(suffix.as_str()).unwrap_or(pair);
                match balances.get(asset) {
                    Some(amount) => total = total.checked_add(amount.checked_mul(ticker.last_trade_price)?)?,
                    None => tracing::warn!(%pair, "Ticker returned a pair without a matching balance"),
                }
            }
        }

        Ok(Reply::text(format!("{label}: {total:.2} {quote}")))
    }
}

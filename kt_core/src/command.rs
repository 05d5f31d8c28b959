// Chat command grammar. Parsing never touches the exchange; balance lookups for
// an omitted trade volume happen later in the interpreter.

use kt_types::FixedPoint;
use kt_types::FixedPointError;
use kt_types::Side;
use thiserror::Error;

pub const BALANCE_SYNTAX: &str = "/balance (['available'])";
pub const ORDERS_SYNTAX: &str = "/orders (['close'] [txid] / ['close-all'])";
pub const PRICE_SYNTAX: &str = "/price [currency] ([currency] ...)";
pub const VALUE_SYNTAX: &str = "/value ([currency])";

pub fn trade_syntax(quote: &str) -> String {
    format!("/trade ['buy' / 'sell'] [currency] [price per unit] ([volume] / [amount'{}'])", quote.to_lowercase())
}

pub fn help_text(quote: &str) -> String {
    [
        "Available commands:".to_string(),
        format!("{BALANCE_SYNTAX} - show balances, or funds available in {quote}"),
        format!("{} - place a limit order", trade_syntax(quote)),
        format!("{ORDERS_SYNTAX} - list or close open orders"),
        format!("{PRICE_SYNTAX} - last trade price in {quote}"),
        format!("{VALUE_SYNTAX} - holdings valued in {quote}"),
        "/help - show this message".to_string(),
    ]
    .join("\n")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Syntax: {0}")]
    Usage(String),

    #[error("Argument should be 'buy' or 'sell' but is '{found}'\nSyntax: {syntax}")]
    Side { found: String, syntax: String },

    #[error(transparent)]
    Number(#[from] FixedPointError),

    #[error("Price must be greater than zero")]
    NonPositivePrice,

    #[error("Unknown command '{0}', send /help for the list of commands")]
    Unknown(String),

    #[error("Empty command")]
    Empty,
}

/// How much to trade, as typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeArg {
    /// Units of the traded currency
    Volume(FixedPoint),
    /// Quote-currency amount to spend or receive, e.g. `50eur`
    Amount(FixedPoint),
    /// Everything available: quote trade balance for buys, held currency for sells
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeArgs {
    pub side: Side,
    /// Kraken asset code, upper case
    pub currency: String,
    pub price: FixedPoint,
    pub volume: VolumeArg,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdersAction {
    List,
    CloseAll,
    Close { txid: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Balance { available: bool },
    Trade(TradeArgs),
    Orders(OrdersAction),
    Price { currencies: Vec<String> },
    Value { currency: Option<String> },
}

impl Command {
    /// Parse one chat message. A leading `/` and a `@botname` suffix on the
    /// command word are optional.
    pub fn parse(text: &str, quote: &str) -> Result<Self, CommandError> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = tokens.collect();

        let name = head.strip_prefix('/').unwrap_or(head);
        let name = name.split_once('@').map_or(name, |(name, _)| name).to_lowercase();

        match name.as_str() {
            "help" | "start" => Ok(Command::Help),
            "balance" => parse_balance(&args),
            "trade" => parse_trade(&args, quote),
            "orders" => parse_orders(&args),
            "price" => parse_price(&args),
            "value" => parse_value(&args),
            _ => Err(CommandError::Unknown(head.to_string())),
        }
    }
}

fn parse_balance(args: &[&str]) -> Result<Command, CommandError> {
    match args {
        [] => Ok(Command::Balance { available: false }),
        [flag] if flag.eq_ignore_ascii_case("available") => Ok(Command::Balance { available: true }),
        _ => Err(CommandError::Usage(BALANCE_SYNTAX.to_string())),
    }
}

fn parse_trade(args: &[&str], quote: &str) -> Result<Command, CommandError> {
    let (side, currency, price, volume) = match args {
        [side, currency, price] => (*side, *currency, *price, None),
        [side, currency, price, volume] => (*side, *currency, *price, Some(*volume)),
        _ => return Err(CommandError::Usage(trade_syntax(quote))),
    };

    let side = Side::parse(side).ok_or_else(|| CommandError::Side { found: side.to_string(), syntax: trade_syntax(quote) })?;

    let price: FixedPoint = price.parse()?;
    if !price.is_positive() {
        return Err(CommandError::NonPositivePrice);
    }

    let volume = match volume {
        Some(token) => parse_volume(token, quote)?,
        None => VolumeArg::Auto,
    };

    Ok(Command::Trade(TradeArgs { side, currency: currency.to_uppercase(), price, volume }))
}

/// A token ending in the quote currency (any case) is an amount, otherwise a volume
fn parse_volume(token: &str, quote: &str) -> Result<VolumeArg, CommandError> {
    let upper = token.to_uppercase();
    match upper.strip_suffix(quote.to_uppercase().as_str()) {
        Some(amount) => Ok(VolumeArg::Amount(amount.parse()?)),
        None => Ok(VolumeArg::Volume(token.parse()?)),
    }
}

fn parse_orders(args: &[&str]) -> Result<Command, CommandError> {
    match args {
        [] => Ok(Command::Orders(OrdersAction::List)),
        [action] if action.eq_ignore_ascii_case("close-all") => Ok(Command::Orders(OrdersAction::CloseAll)),
        [action, txid] if action.eq_ignore_ascii_case("close") => Ok(Command::Orders(OrdersAction::Close { txid: txid.to_string() })),
        _ => Err(CommandError::Usage(ORDERS_SYNTAX.to_string())),
    }
}

fn parse_price(args: &[&str]) -> Result<Command, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Usage(PRICE_SYNTAX.to_string()));
    }
    Ok(Command::Price { currencies: args.iter().map(|currency| currency.to_uppercase()).collect() })
}

fn parse_value(args: &[&str]) -> Result<Command, CommandError> {
    match args {
        [] => Ok(Command::Value { currency: None }),
        [currency] => Ok(Command::Value { currency: Some(currency.to_uppercase()) }),
        _ => Err(CommandError::Usage(VALUE_SYNTAX.to_string())),
    }
}

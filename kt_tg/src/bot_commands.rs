use teloxide::utils::command::BotCommands;

/// Command menu shown by Telegram clients. Parsing of the arguments happens in
/// `kt_core::Command`; this list only feeds `set_my_commands`.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Kraken order desk:")]
pub enum MenuCommand {
    #[command(description = "Show balances (/balance available for funds in the quote currency)")]
    Balance,

    #[command(description = "Place a limit order: /trade buy|sell <currency> <price> [<volume>|<amount><quote>]")]
    Trade,

    #[command(description = "List open orders (/orders close <txid>, /orders close-all)")]
    Orders,

    #[command(description = "Last trade price: /price <currency> ...")]
    Price,

    #[command(description = "Value of holdings in the quote currency: /value [<currency>]")]
    Value,

    #[command(description = "Show help message")]
    Help,
}

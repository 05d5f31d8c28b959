use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use kt_app::cli;
use kt_app::load_bot_config;
use kt_app::tracing_setup;
use kt_core::OrderMonitor;
use kt_core::TradeDesk;
use kt_core::reconcile_open_orders;
use kt_http::KrakenClient;
use kt_http::KrakenCredentials;
use kt_tg::MenuCommand;
use kt_tg::forward_notifications;
use kt_tg::handle_callback;
use kt_tg::handle_message;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::sync::mpsc;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_path = cli::config_path();
    let config = load_bot_config(&config_path).with_context(|| format!("loading {}", config_path.display()))?;
    let _guard = tracing_setup::init("kraken_bot", &config.log_dir, Level::INFO).context("initialising logging")?;

    let settings = Arc::new(config.settings.clone());
    tracing::info!(
        user_id = settings.user_id,
        quote = settings.quote(),
        check_trade = settings.check_trade,
        check_trade_time = settings.check_trade_time,
        "Configuration loaded"
    );

    let mut builder = KrakenClient::builder().credentials(load_credentials(&config.kraken_key_file)?);
    if let Some(base_url) = &config.kraken_base_url {
        builder = builder.base_url(base_url.as_str());
    }
    let gateway = Arc::new(builder.build()?);

    let token = match &config.bot_token {
        Some(token) => token.clone(),
        None => std::env::var("TELOXIDE_TOKEN").context("no bot_token configured and TELOXIDE_TOKEN is not set")?,
    };
    let bot = Bot::new(token);

    let (notify_tx, notify_rx) = mpsc::unbounded_channel();
    let monitor = if settings.check_trade {
        let (monitor, _task) = OrderMonitor::spawn(gateway.clone(), settings.poll_interval(), notify_tx.clone());
        // A failed listing has already been sent to the owner; the desk still starts
        if let Err(err) = reconcile_open_orders(gateway.as_ref(), &monitor, settings.owner(), &notify_tx).await {
            tracing::error!("Startup reconciliation failed: {err}");
        }
        Some(monitor)
    } else {
        tracing::info!("Order monitoring disabled");
        None
    };
    drop(notify_tx);
    tokio::spawn(forward_notifications(bot.clone(), notify_rx));

    if let Err(err) = bot.set_my_commands(MenuCommand::bot_commands()).await {
        tracing::warn!("Failed to register command menu: {err}");
    }

    let desk = Arc::new(TradeDesk::new(gateway, settings, monitor));
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message::<KrakenClient>))
        .branch(Update::filter_callback_query().endpoint(handle_callback::<KrakenClient>));

    tracing::info!("Starting Telegram bot dispatcher...");
    Dispatcher::builder(bot, handler).dependencies(dptree::deps![desk]).enable_ctrlc_handler().build().dispatch().await;

    Ok(())
}

/// Key file when present, otherwise `KRAKEN_API_KEY` / `KRAKEN_API_SECRET`
fn load_credentials(key_file: &Path) -> anyhow::Result<KrakenCredentials> {
    if key_file.exists() {
        return KrakenCredentials::from_key_file(key_file).with_context(|| format!("reading {}", key_file.display()));
    }
    tracing::info!(key_file = %key_file.display(), "Key file not found, reading credentials from environment");
    KrakenCredentials::from_env().context("no Kraken key file and KRAKEN_API_KEY / KRAKEN_API_SECRET are not set")
}

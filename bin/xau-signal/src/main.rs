use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, LogNotifier, Notifier, PriceFeed};
use engine::{CycleConfig, Poller, TwelveDataClient};
use strategy::StrategyFileConfig;
use telegram_notify::TelegramNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("loading configuration")?;
    let strategy_cfg = StrategyFileConfig::load(cfg.strategy_config_path.as_deref())
        .context("loading strategy parameters")?;
    info!(
        symbol = %cfg.symbol,
        interval = %cfg.interval,
        output_size = cfg.output_size,
        "XAU signal bot starting"
    );

    // ── Collaborators ─────────────────────────────────────────────────────────
    let feed: Arc<dyn PriceFeed> = Arc::new(
        TwelveDataClient::new(&cfg.twelvedata_api_key, cfg.http_timeout)
            .context("building price feed client")?,
    );

    let notifier: Arc<dyn Notifier> = match cfg.telegram() {
        Some((token, chat)) => Arc::new(
            TelegramNotifier::new(token, chat, cfg.http_timeout)
                .context("building Telegram notifier")?,
        ),
        None => {
            warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set, reports go to the log only");
            Arc::new(LogNotifier)
        }
    };

    // ── Poll loop ─────────────────────────────────────────────────────────────
    let poller = Poller::new(
        CycleConfig::new(&cfg, &strategy_cfg),
        feed,
        notifier,
        cfg.poll_interval,
    )
    .with_max_cycles(cfg.max_cycles);

    tokio::select! {
        stats = poller.run() => {
            info!(?stats, "Poller finished");
        }
        res = tokio::signal::ctrl_c() => {
            res.context("listening for shutdown signal")?;
            info!("Shutdown signal received. Exiting.");
        }
    }
    Ok(())
}

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use common::{
    Config, Error, FeedRequest, Notifier, PriceFeed, SignalDecision, Series, MIN_VALID_BARS,
};
use strategy::{IndicatorEngine, SignalGenerator, StrategyFileConfig};

/// Immutable inputs of every cycle, built once at startup.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    pub request: FeedRequest,
    pub engine: IndicatorEngine,
    pub generator: SignalGenerator,
}

impl CycleConfig {
    pub fn new(config: &Config, strategy: &StrategyFileConfig) -> Self {
        let engine = IndicatorEngine::new(&strategy.indicators);
        Self {
            request: config.feed_request(),
            generator: SignalGenerator::new(strategy.signal, engine.ema_spans()),
            engine,
        }
    }
}

/// Why a cycle was abandoned.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Fetch failed or the feed returned unusable data.
    #[error("feed: {0}")]
    Feed(#[source] Error),

    /// Not enough bars to compare the last two.
    #[error("signal: {0}")]
    Signal(#[source] Error),
}

/// What happened to the report of an actionable signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// HOLD: nothing to send.
    Skipped,
    Sent,
    /// Delivery failed; the cycle still completed.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub decision: SignalDecision,
    /// Bars the decision was computed from.
    pub bars: usize,
    pub delivery: Delivery,
}

/// Fetch, compute, decide and notify once.
///
/// Nothing is kept between calls: the series is rebuilt from the feed every
/// time. Notifier failures are logged and reported in the outcome, never
/// returned as errors.
pub async fn run_cycle(
    config: &CycleConfig,
    feed: &dyn PriceFeed,
    notifier: &dyn Notifier,
) -> Result<CycleOutcome, CycleError> {
    let raw = feed
        .fetch_bars(&config.request)
        .await
        .map_err(CycleError::Feed)?;
    let series = Series::new(raw).map_err(CycleError::Feed)?;

    if series.len() < MIN_VALID_BARS {
        warn!(
            bars = series.len(),
            required = MIN_VALID_BARS,
            "Short series, some indicators will be undefined"
        );
    }

    let annotated = config.engine.annotate(&series);
    let decision = config
        .generator
        .evaluate(&config.request.symbol, &annotated, Utc::now())
        .map_err(CycleError::Signal)?;

    info!("{}", decision.summary_line());

    let delivery = if decision.signal.is_actionable() {
        let report = decision.report();
        info!(signal = %decision.signal, "{report}");
        match notifier.notify(&report).await {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                warn!(notifier = notifier.name(), error = %e, "Failed to deliver signal report");
                Delivery::Failed(e.to_string())
            }
        }
    } else {
        Delivery::Skipped
    };

    Ok(CycleOutcome {
        decision,
        bars: series.len(),
        delivery,
    })
}

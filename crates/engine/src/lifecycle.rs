use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use common::{Notifier, PriceFeed};

use crate::cycle::{run_cycle, CycleConfig, Delivery};

/// Counters reported when a bounded poller finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    pub cycles: u64,
    pub signals: u64,
    pub failures: u64,
    pub undelivered: u64,
}

/// Drives `run_cycle` on a fixed period.
///
/// Owns the tolerance policy: a failed cycle is logged and abandoned, then the
/// poller sleeps and tries again. Every failure is handled the same way; there
/// is no backoff.
pub struct Poller {
    config: CycleConfig,
    feed: Arc<dyn PriceFeed>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    /// `None` = run until the task is dropped.
    max_cycles: Option<u64>,
}

impl Poller {
    pub fn new(
        config: CycleConfig,
        feed: Arc<dyn PriceFeed>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            config,
            feed,
            notifier,
            poll_interval,
            max_cycles: None,
        }
    }

    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Run cycles back to back, sleeping `poll_interval` between them.
    /// Returns only when `max_cycles` is reached.
    pub async fn run(self) -> PollerStats {
        info!(
            symbol = %self.config.request.symbol,
            interval = %self.config.request.interval,
            poll_secs = self.poll_interval.as_secs(),
            notifier = self.notifier.name(),
            "Poller started"
        );

        let mut stats = PollerStats::default();
        loop {
            if self.max_cycles.is_some_and(|max| stats.cycles >= max) {
                info!(?stats, "Cycle limit reached, poller stopping");
                return stats;
            }
            stats.cycles += 1;

            match run_cycle(&self.config, self.feed.as_ref(), self.notifier.as_ref()).await {
                Ok(outcome) => {
                    if outcome.decision.signal.is_actionable() {
                        stats.signals += 1;
                    }
                    if matches!(outcome.delivery, Delivery::Failed(_)) {
                        stats.undelivered += 1;
                    }
                }
                Err(e) => {
                    stats.failures += 1;
                    error!(cycle = stats.cycles, error = %e, "Cycle failed, skipping");
                }
            }

            if self.max_cycles.is_some_and(|max| stats.cycles >= max) {
                continue;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

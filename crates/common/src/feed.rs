use async_trait::async_trait;

use crate::{Bar, Result};

/// Parameters of a single time-series request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Instrument symbol, e.g. "XAU/USD".
    pub symbol: String,
    /// Bar interval, e.g. "15min".
    pub interval: String,
    /// Number of most recent bars to request.
    pub output_size: usize,
}

/// Abstraction over the price feed.
///
/// `TwelveDataClient` in `crates/engine` implements this against the REST API.
/// Tests substitute an in-memory feed.
///
/// Implementations return bars in whatever order the upstream sends them;
/// callers must build a `Series` before computing indicators.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_bars(&self, request: &FeedRequest) -> Result<Vec<Bar>>;
}

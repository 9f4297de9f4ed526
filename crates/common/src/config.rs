use std::time::Duration;

use crate::{Error, FeedRequest, Result};

/// All configuration loaded from environment variables at startup.
/// Read once; nothing re-reads the environment mid-run.
#[derive(Debug, Clone)]
pub struct Config {
    // Price feed
    pub twelvedata_api_key: String,
    pub symbol: String,
    pub interval: String,
    pub output_size: usize,

    // Polling
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    /// `None` = poll until the process is stopped.
    pub max_cycles: Option<u64>,

    // Telegram (both must be set to enable it)
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    // Strategy parameter file; built-in defaults when unset
    pub strategy_config_path: Option<String>,
}

impl Config {
    pub const DEFAULT_SYMBOL: &'static str = "XAU/USD";
    pub const DEFAULT_INTERVAL: &'static str = "15min";
    pub const DEFAULT_OUTPUT_SIZE: usize = 100;
    pub const DEFAULT_POLL_SECS: u64 = 900;
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let twelvedata_api_key = get("TWELVEDATA_API_KEY").ok_or_else(|| {
            Error::Config(
                "Required environment variable 'TWELVEDATA_API_KEY' is not set. Check your .env file."
                    .into(),
            )
        })?;

        let output_size = parse_or(&get, "OUTPUT_SIZE", Self::DEFAULT_OUTPUT_SIZE)?;
        if output_size < 2 {
            return Err(Error::Config(format!(
                "OUTPUT_SIZE must be at least 2, got {output_size}"
            )));
        }

        let poll_secs: u64 = parse_or(&get, "POLL_INTERVAL_SECS", Self::DEFAULT_POLL_SECS)?;
        if poll_secs == 0 {
            return Err(Error::Config("POLL_INTERVAL_SECS must be positive".into()));
        }
        let timeout_secs: u64 =
            parse_or(&get, "HTTP_TIMEOUT_SECS", Self::DEFAULT_HTTP_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(Error::Config("HTTP_TIMEOUT_SECS must be positive".into()));
        }

        let max_cycles = match get("MAX_CYCLES") {
            Some(v) => Some(v.parse::<u64>().map_err(|_| {
                Error::Config(format!("MAX_CYCLES must be a non-negative integer, got '{v}'"))
            })?),
            None => None,
        };

        Ok(Config {
            twelvedata_api_key,
            symbol: get("SYMBOL").unwrap_or_else(|| Self::DEFAULT_SYMBOL.to_string()),
            interval: get("INTERVAL").unwrap_or_else(|| Self::DEFAULT_INTERVAL.to_string()),
            output_size,
            poll_interval: Duration::from_secs(poll_secs),
            http_timeout: Duration::from_secs(timeout_secs),
            max_cycles,
            telegram_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            strategy_config_path: get("STRATEGY_CONFIG_PATH"),
        })
    }

    /// The time-series request issued every cycle.
    pub fn feed_request(&self) -> FeedRequest {
        FeedRequest {
            symbol: self.symbol.clone(),
            interval: self.interval.clone(),
            output_size: self.output_size,
        }
    }

    /// Token and chat id, when Telegram delivery is fully configured.
    pub fn telegram(&self) -> Option<(&str, &str)> {
        match (&self.telegram_token, &self.telegram_chat_id) {
            (Some(token), Some(chat)) => Some((token.as_str(), chat.as_str())),
            _ => None,
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => v
            .parse()
            .map_err(|_| Error::Config(format!("{key} has an invalid value: '{v}'"))),
        None => Ok(default),
    }
}

use serde::{Deserialize, Serialize};
use tracing::info;

use common::{Error, Result};

use crate::indicators::EmaWeighting;

/// Strategy parameter file (TOML). Every field is optional.
///
/// Example `config/strategy.toml`:
/// ```toml
/// [indicators]
/// ema_fast = 8
/// ema_slow = 21
/// ema_weighting = "recursive"
/// rsi_period = 14
/// atr_period = 14
///
/// [signal]
/// rsi_buy_below = 80.0
/// rsi_sell_above = 20.0
/// stop_atr_multiple = 2.0
/// target_atr_multiple = 2.5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyFileConfig {
    pub indicators: IndicatorParams,
    pub signal: SignalParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_weighting: EmaWeighting,
    pub rsi_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 8,
            ema_slow: 21,
            ema_weighting: EmaWeighting::Recursive,
            rsi_period: 14,
            atr_period: 14,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalParams {
    /// BUY requires RSI strictly below this.
    pub rsi_buy_below: f64,
    /// SELL requires RSI strictly above this.
    pub rsi_sell_above: f64,
    pub stop_atr_multiple: f64,
    pub target_atr_multiple: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            rsi_buy_below: 80.0,
            rsi_sell_above: 20.0,
            stop_atr_multiple: 2.0,
            target_atr_multiple: 2.5,
        }
    }
}

impl StrategyFileConfig {
    /// Load from a TOML file, or return defaults when `path` is `None`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            info!("No strategy config file set, using built-in parameters");
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read strategy config at '{path}': {e}"))
        })?;
        let cfg = Self::from_toml(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{path}: {msg}")),
            other => other,
        })?;
        info!(path = %path, ?cfg, "Loaded strategy config");
        Ok(cfg)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse strategy config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let ind = &self.indicators;
        if ind.ema_fast == 0 || ind.ema_slow == 0 {
            return Err(Error::Config("EMA spans must be positive".into()));
        }
        if ind.ema_fast >= ind.ema_slow {
            return Err(Error::Config(format!(
                "ema_fast ({}) must be less than ema_slow ({})",
                ind.ema_fast, ind.ema_slow
            )));
        }
        if ind.rsi_period < 2 || ind.atr_period == 0 {
            return Err(Error::Config(
                "rsi_period must be >= 2 and atr_period must be positive".into(),
            ));
        }
        let sig = &self.signal;
        if !(0.0..=100.0).contains(&sig.rsi_buy_below) || !(0.0..=100.0).contains(&sig.rsi_sell_above) {
            return Err(Error::Config("RSI thresholds must lie within 0..=100".into()));
        }
        if !(sig.stop_atr_multiple.is_finite() && sig.stop_atr_multiple >= 0.0)
            || !(sig.target_atr_multiple.is_finite() && sig.target_atr_multiple >= 0.0)
        {
            return Err(Error::Config("ATR multiples must be finite and non-negative".into()));
        }
        Ok(())
    }
}

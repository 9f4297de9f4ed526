use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Bars needed before every indicator on the last bar is defined:
/// 21 for the slow EMA warm-up plus one for the first price delta.
pub const MIN_VALID_BARS: usize = 22;

/// One OHLC observation from the price feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Not every instrument reports volume (spot FX and metals do not).
    pub volume: Option<f64>,
}

/// Bars of one fetch, ordered by strictly increasing timestamp.
///
/// The feed does not guarantee ordering, so `new` sorts before anything
/// downstream sees the data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Sort `bars` ascending by timestamp. Two bars sharing a timestamp are rejected.
    pub fn new(mut bars: Vec<Bar>) -> Result<Self> {
        bars.sort_by_key(|b| b.timestamp);
        if let Some(dup) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(Error::DuplicateTimestamp(dup[1].timestamp));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

/// A bar plus the indicator values computed for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBar {
    pub bar: Bar,
    pub ema_fast: f64,
    pub ema_slow: f64,
    /// `None` during warm-up and when the window saw no price change at all.
    pub rsi: Option<f64>,
    /// `None` until a full window of true ranges exists.
    pub atr: Option<f64>,
}

/// Discrete trade decision for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl SignalKind {
    pub fn is_actionable(self) -> bool {
        !matches!(self, SignalKind::Hold)
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::Hold => write!(f, "HOLD"),
        }
    }
}

/// Stop and target bracketing an entry.
///
/// A zero level is a legitimate value, so absence is modelled explicitly
/// rather than with a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RiskLevels {
    /// HOLD decisions carry no levels.
    NotApplicable,
    /// Actionable signal, but ATR was not yet defined on the last bar.
    Undefined,
    Levels { stop: f64, target: f64 },
}

impl RiskLevels {
    pub fn stop(&self) -> Option<f64> {
        match self {
            RiskLevels::Levels { stop, .. } => Some(*stop),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<f64> {
        match self {
            RiskLevels::Levels { target, .. } => Some(*target),
            _ => None,
        }
    }
}

/// Output of one evaluation cycle. Values are kept at full precision;
/// rounding happens only in `report` and `summary_line`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDecision {
    /// Wall-clock time the decision was made.
    pub evaluated_at: DateTime<Utc>,
    /// Timestamp of the bar the decision is based on.
    pub bar_time: DateTime<Utc>,
    pub symbol: String,
    pub signal: SignalKind,
    /// Close of the last bar.
    pub price: f64,
    pub rsi: Option<f64>,
    pub ema_fast: f64,
    pub ema_slow: f64,
    /// Spans the two EMAs were computed with, for labelling.
    pub ema_spans: (usize, usize),
    pub atr: Option<f64>,
    pub risk: RiskLevels,
}

impl SignalDecision {
    /// Multi-line report sent to the notifier on BUY/SELL.
    pub fn report(&self) -> String {
        let mut text = format!(
            "📊 {} Signal @ {}\n\
             Signal: {}\n\
             Price: {:.2}\n\
             RSI: {} | EMA{}: {:.2} | EMA{}: {:.2}\n\
             ATR: {}\n",
            display_symbol(&self.symbol),
            format_time(self.evaluated_at),
            self.signal,
            round2(self.price),
            fmt_opt(self.rsi),
            self.ema_spans.0,
            round2(self.ema_fast),
            self.ema_spans.1,
            round2(self.ema_slow),
            fmt_opt(self.atr),
        );
        match self.risk {
            RiskLevels::Levels { stop, target } => {
                text.push_str(&format!(
                    "🎯 Target: {:.2} | 🛑 Stop: {:.2}",
                    round2(target),
                    round2(stop)
                ));
            }
            RiskLevels::Undefined => {
                text.push_str("🎯 Target: n/a | 🛑 Stop: n/a (ATR undefined)");
            }
            RiskLevels::NotApplicable => {}
        }
        text
    }

    /// One-line console summary emitted every cycle.
    pub fn summary_line(&self) -> String {
        format!(
            "{} | {} | Price: {:.2}",
            format_time(self.evaluated_at),
            self.signal,
            round2(self.price)
        )
    }
}

/// Round half away from zero to two decimals. Negative zero becomes zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", round2(v)),
        None => "n/a".to_string(),
    }
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// "XAU/USD" -> "XAUUSD"
fn display_symbol(symbol: &str) -> String {
    symbol.replace('/', "")
}

pub mod atr;
pub mod ema;
pub mod rsi;

pub use atr::AtrIndicator;
pub use ema::{EmaIndicator, EmaWeighting};
pub use rsi::RsiIndicator;

use common::{AnnotatedBar, Bar, Series};

use crate::config::IndicatorParams;

/// Annotates bars with trend (EMA fast/slow), momentum (RSI) and volatility (ATR).
///
/// Pure: the same input always yields bit-identical output. Short inputs are
/// not an error; indicators without enough history are left as `None`.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorEngine {
    ema_fast: EmaIndicator,
    ema_slow: EmaIndicator,
    rsi: RsiIndicator,
    atr: AtrIndicator,
}

impl IndicatorEngine {
    pub fn new(params: &IndicatorParams) -> Self {
        Self {
            ema_fast: EmaIndicator::new(params.ema_fast, params.ema_weighting),
            ema_slow: EmaIndicator::new(params.ema_slow, params.ema_weighting),
            rsi: RsiIndicator::new(params.rsi_period),
            atr: AtrIndicator::new(params.atr_period),
        }
    }

    /// EMA spans as (fast, slow).
    pub fn ema_spans(&self) -> (usize, usize) {
        (self.ema_fast.span, self.ema_slow.span)
    }

    /// Annotate a sorted series.
    pub fn annotate(&self, series: &Series) -> Vec<AnnotatedBar> {
        self.annotate_bars(series.bars())
    }

    /// Annotate bars in the order given. Callers are responsible for ordering;
    /// prefer `annotate` with a `Series`.
    pub fn annotate_bars(&self, bars: &[Bar]) -> Vec<AnnotatedBar> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let ema_fast = self.ema_fast.series(&closes);
        let ema_slow = self.ema_slow.series(&closes);
        let rsi = self.rsi.series(&closes);
        let atr = self.atr.series(bars);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| AnnotatedBar {
                bar: *bar,
                ema_fast: ema_fast[i],
                ema_slow: ema_slow[i],
                rsi: rsi[i],
                atr: atr[i],
            })
            .collect()
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(&IndicatorParams::default())
    }
}

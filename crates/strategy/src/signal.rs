use chrono::{DateTime, Utc};

use common::{AnnotatedBar, Error, Result, RiskLevels, SignalDecision, SignalKind};

use crate::config::{IndicatorParams, SignalParams};

/// Reduces annotated bars to one BUY/SELL/HOLD decision.
///
/// Only the last two bars matter. No state is carried between calls, so a
/// crossover that is still visible next cycle is reported again.
#[derive(Debug, Clone, Copy)]
pub struct SignalGenerator {
    params: SignalParams,
    ema_spans: (usize, usize),
}

impl SignalGenerator {
    pub fn new(params: SignalParams, ema_spans: (usize, usize)) -> Self {
        Self { params, ema_spans }
    }

    /// Evaluate the last two bars. Fewer than two bars is an error, not a HOLD.
    pub fn evaluate(
        &self,
        symbol: &str,
        bars: &[AnnotatedBar],
        now: DateTime<Utc>,
    ) -> Result<SignalDecision> {
        let [.., prev, curr] = bars else {
            return Err(Error::InsufficientData {
                required: 2,
                available: bars.len(),
            });
        };

        let signal = self.classify(prev, curr);
        let price = curr.bar.close;

        Ok(SignalDecision {
            evaluated_at: now,
            bar_time: curr.bar.timestamp,
            symbol: symbol.to_string(),
            signal,
            price,
            rsi: curr.rsi,
            ema_fast: curr.ema_fast,
            ema_slow: curr.ema_slow,
            ema_spans: self.ema_spans,
            atr: curr.atr,
            risk: self.risk_levels(signal, price, curr.atr),
        })
    }

    /// Crossover test on full-precision values. Equality on either bar is HOLD,
    /// as is an undefined RSI on the current bar.
    pub fn classify(&self, prev: &AnnotatedBar, curr: &AnnotatedBar) -> SignalKind {
        let crossed_up = prev.ema_fast < prev.ema_slow && curr.ema_fast > curr.ema_slow;
        let crossed_down = prev.ema_fast > prev.ema_slow && curr.ema_fast < curr.ema_slow;

        match curr.rsi {
            Some(rsi) if crossed_up && rsi < self.params.rsi_buy_below => SignalKind::Buy,
            Some(rsi) if crossed_down && rsi > self.params.rsi_sell_above => SignalKind::Sell,
            _ => SignalKind::Hold,
        }
    }

    /// Stop and target as ATR multiples around `price`.
    pub fn risk_levels(&self, signal: SignalKind, price: f64, atr: Option<f64>) -> RiskLevels {
        if !signal.is_actionable() {
            return RiskLevels::NotApplicable;
        }
        let Some(atr) = atr.filter(|a| a.is_finite()) else {
            return RiskLevels::Undefined;
        };

        let stop_dist = self.params.stop_atr_multiple * atr;
        let target_dist = self.params.target_atr_multiple * atr;
        match signal {
            SignalKind::Buy => RiskLevels::Levels {
                stop: price - stop_dist,
                target: price + target_dist,
            },
            SignalKind::Sell => RiskLevels::Levels {
                stop: price + stop_dist,
                target: price - target_dist,
            },
            SignalKind::Hold => RiskLevels::NotApplicable,
        }
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        let ind = IndicatorParams::default();
        Self::new(SignalParams::default(), (ind.ema_fast, ind.ema_slow))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use common::Bar;

    use super::*;

    fn bar(minute: u32, close: f64, fast: f64, slow: f64, rsi: Option<f64>, atr: Option<f64>) -> AnnotatedBar {
        AnnotatedBar {
            bar: Bar {
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: None,
            },
            ema_fast: fast,
            ema_slow: slow,
            rsi,
            atr,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    #[test]
    fn bullish_cross_is_buy_with_levels() {
        let bars = [
            bar(0, 100.0, 9.0, 10.0, Some(50.0), Some(1.0)),
            bar(15, 101.0, 10.5, 10.0, Some(60.0), Some(2.0)),
        ];
        let d = SignalGenerator::default().evaluate("XAU/USD", &bars, now()).unwrap();
        assert_eq!(d.signal, SignalKind::Buy);
        assert_eq!(d.price, 101.0);
        assert_eq!(d.bar_time, bars[1].bar.timestamp);
        assert_eq!(d.evaluated_at, now());
        assert_eq!(d.risk, RiskLevels::Levels { stop: 97.0, target: 106.0 });
    }

    #[test]
    fn bearish_cross_is_sell_with_levels() {
        let bars = [
            bar(0, 100.0, 11.0, 10.0, Some(50.0), Some(1.0)),
            bar(15, 99.0, 9.5, 10.0, Some(40.0), Some(2.0)),
        ];
        let d = SignalGenerator::default().evaluate("XAU/USD", &bars, now()).unwrap();
        assert_eq!(d.signal, SignalKind::Sell);
        assert_eq!(d.risk, RiskLevels::Levels { stop: 103.0, target: 94.0 });
    }

    #[test]
    fn overbought_blocks_buy() {
        let g = SignalGenerator::default();
        let prev = bar(0, 100.0, 9.0, 10.0, Some(50.0), Some(1.0));
        assert_eq!(g.classify(&prev, &bar(15, 101.0, 11.0, 10.0, Some(80.0), Some(1.0))), SignalKind::Hold);
        assert_eq!(g.classify(&prev, &bar(15, 101.0, 11.0, 10.0, Some(79.99), Some(1.0))), SignalKind::Buy);
    }

    #[test]
    fn oversold_blocks_sell() {
        let g = SignalGenerator::default();
        let prev = bar(0, 100.0, 11.0, 10.0, Some(50.0), Some(1.0));
        assert_eq!(g.classify(&prev, &bar(15, 99.0, 9.0, 10.0, Some(20.0), Some(1.0))), SignalKind::Hold);
        assert_eq!(g.classify(&prev, &bar(15, 99.0, 9.0, 10.0, Some(20.01), Some(1.0))), SignalKind::Sell);
    }

    #[test]
    fn equality_on_either_bar_is_hold() {
        let g = SignalGenerator::default();
        let touching = bar(0, 100.0, 10.0, 10.0, Some(50.0), Some(1.0));
        let above = bar(15, 101.0, 11.0, 10.0, Some(50.0), Some(1.0));
        let below = bar(15, 99.0, 9.0, 10.0, Some(50.0), Some(1.0));
        assert_eq!(g.classify(&touching, &above), SignalKind::Hold);
        assert_eq!(g.classify(&touching, &below), SignalKind::Hold);

        let prev_below = bar(0, 100.0, 9.0, 10.0, Some(50.0), Some(1.0));
        let curr_touching = bar(15, 100.0, 10.0, 10.0, Some(50.0), Some(1.0));
        assert_eq!(g.classify(&prev_below, &curr_touching), SignalKind::Hold);
    }

    #[test]
    fn undefined_rsi_is_hold() {
        let g = SignalGenerator::default();
        let prev = bar(0, 100.0, 9.0, 10.0, None, None);
        let curr = bar(15, 101.0, 11.0, 10.0, None, None);
        assert_eq!(g.classify(&prev, &curr), SignalKind::Hold);
    }

    #[test]
    fn missing_atr_gives_undefined_levels() {
        let bars = [
            bar(0, 100.0, 9.0, 10.0, Some(50.0), None),
            bar(15, 101.0, 11.0, 10.0, Some(50.0), None),
        ];
        let d = SignalGenerator::default().evaluate("XAU/USD", &bars, now()).unwrap();
        assert_eq!(d.signal, SignalKind::Buy);
        assert_eq!(d.risk, RiskLevels::Undefined);
    }

    #[test]
    fn zero_level_is_a_value_not_absence() {
        let g = SignalGenerator::default();
        // price 2, ATR 1 → BUY stop = 2 − 2·1 = 0
        assert_eq!(
            g.risk_levels(SignalKind::Buy, 2.0, Some(1.0)),
            RiskLevels::Levels { stop: 0.0, target: 4.5 }
        );
    }

    #[test]
    fn hold_has_no_levels() {
        let g = SignalGenerator::default();
        assert_eq!(g.risk_levels(SignalKind::Hold, 100.0, Some(1.0)), RiskLevels::NotApplicable);
    }

    #[test]
    fn comparisons_use_unrounded_values() {
        let g = SignalGenerator::default();
        // Both differences vanish at two decimals but are real crossovers.
        let prev = bar(0, 100.0, 10.001, 10.002, Some(50.0), Some(1.0));
        let curr = bar(15, 100.0, 10.003, 10.002, Some(50.0), Some(1.0));
        assert_eq!(g.classify(&prev, &curr), SignalKind::Buy);
    }

    #[test]
    fn single_bar_is_insufficient_data() {
        let bars = [bar(0, 100.0, 9.0, 10.0, Some(50.0), Some(1.0))];
        let err = SignalGenerator::default().evaluate("XAU/USD", &bars, now()).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { required: 2, available: 1 }));

        let err = SignalGenerator::default().evaluate("XAU/USD", &[], now()).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { available: 0, .. }));
    }

    #[test]
    fn only_last_two_bars_matter() {
        let bars = [
            bar(0, 100.0, 20.0, 10.0, Some(50.0), Some(1.0)),
            bar(15, 100.0, 9.0, 10.0, Some(50.0), Some(1.0)),
            bar(30, 101.0, 11.0, 10.0, Some(50.0), Some(1.0)),
        ];
        let d = SignalGenerator::default().evaluate("XAU/USD", &bars, now()).unwrap();
        assert_eq!(d.signal, SignalKind::Buy);
    }

    #[test]
    fn custom_thresholds_apply() {
        let params = SignalParams {
            rsi_buy_below: 55.0,
            ..SignalParams::default()
        };
        let g = SignalGenerator::new(params, (8, 21));
        let prev = bar(0, 100.0, 9.0, 10.0, Some(50.0), Some(1.0));
        let curr = bar(15, 101.0, 11.0, 10.0, Some(60.0), Some(1.0));
        assert_eq!(g.classify(&prev, &curr), SignalKind::Hold);
    }
}

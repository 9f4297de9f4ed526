// Average True Range: simple rolling mean of the per-bar true range.
//
//   TR_i  = max(H_i − L_i, |H_i − C_{i−1}|, |L_i − C_{i−1}|)
//   TR_0  = H_0 − L_0          (no previous close)
//   ATR_i = mean(TR_{i−period+1} ..= TR_i)

use common::Bar;

#[derive(Debug, Clone, Copy)]
pub struct AtrIndicator {
    pub period: usize,
}

impl AtrIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self { period }
    }

    /// One value per bar (oldest first); `None` until `period` true ranges exist.
    pub fn series(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let ranges = true_ranges(bars);
        let mut out = vec![None; bars.len()];
        for (i, window) in ranges.windows(self.period).enumerate() {
            out[i + self.period - 1] = Some(window.iter().sum::<f64>() / self.period as f64);
        }
        out
    }
}

/// True range of every bar. The first bar only has its own high−low span.
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    let mut prev_close: Option<f64> = None;
    bars.iter()
        .map(|bar| {
            let span = bar.high - bar.low;
            let tr = match prev_close {
                Some(pc) => span.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
                None => span,
            };
            prev_close = Some(bar.close);
            tr
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn bars(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ohlc.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Bar {
                timestamp: start + Duration::minutes(15 * i as i64),
                open,
                high,
                low,
                close,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn first_bar_uses_high_low_only() {
        let b = bars(&[(10.0, 12.0, 9.0, 11.0)]);
        assert_eq!(true_ranges(&b), vec![3.0]);
    }

    #[test]
    fn gap_up_uses_previous_close() {
        // Previous close 10, next bar trades 14..15 → TR = 15 − 10 = 5
        let b = bars(&[(10.0, 10.5, 9.5, 10.0), (14.0, 15.0, 14.0, 14.5)]);
        assert_eq!(true_ranges(&b), vec![1.0, 5.0]);
    }

    #[test]
    fn gap_down_uses_previous_close() {
        // Previous close 20, next bar trades 15..16 → TR = |15 − 20| = 5
        let b = bars(&[(20.0, 20.5, 19.5, 20.0), (16.0, 16.0, 15.0, 15.5)]);
        assert_eq!(true_ranges(&b)[1], 5.0);
    }

    #[test]
    fn atr_undefined_before_full_window() {
        let b = bars(&[(1.0, 2.0, 0.0, 1.0); 13]);
        let atr = AtrIndicator::new(14).series(&b);
        assert_eq!(atr.len(), 13);
        assert!(atr.iter().all(Option::is_none));
    }

    #[test]
    fn atr_is_rolling_mean_of_true_range() {
        let b = bars(&[
            (10.0, 11.0, 9.0, 10.0),  // TR 2
            (10.0, 14.0, 10.0, 13.0), // TR 4
            (13.0, 13.0, 12.0, 12.0), // TR 1
            (12.0, 12.0, 6.0, 7.0),   // TR 6
        ]);
        let atr = AtrIndicator::new(3).series(&b);
        assert_eq!(atr[0], None);
        assert_eq!(atr[1], None);
        assert!((atr[2].unwrap() - 7.0 / 3.0).abs() < 1e-12);
        assert!((atr[3].unwrap() - 11.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input() {
        assert!(AtrIndicator::new(14).series(&[]).is_empty());
        assert!(true_ranges(&[]).is_empty());
    }
}

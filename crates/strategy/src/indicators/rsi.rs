/// RSI (Relative Strength Index) indicator.
///
/// Uses a simple rolling mean of gains and losses over the trailing `period`
/// price changes (not Wilder smoothing). The first bar has no change, so the
/// value at index `i` is defined only for `i >= period`.
///
/// When the window has no losses the ratio is infinite: RSI is 100 if there
/// were gains and undefined if the price did not move at all.
#[derive(Debug, Clone, Copy)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period }
    }

    /// One value per close (oldest first); `None` where undefined.
    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; closes.len()];
        if closes.len() <= self.period {
            return out;
        }

        // changes[j] is the move into bar j + 1
        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        for (i, window) in changes.windows(self.period).enumerate() {
            out[i + self.period] = rsi_from_changes(window);
        }
        out
    }
}

fn rsi_from_changes(changes: &[f64]) -> Option<f64> {
    let n = changes.len() as f64;
    let avg_gain = changes.iter().filter(|&&c| c > 0.0).sum::<f64>() / n;
    let avg_loss = changes.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>() / n;

    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

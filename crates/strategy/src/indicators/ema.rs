use serde::{Deserialize, Serialize};

/// How past observations are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmaWeighting {
    /// `ema_n = α·x_n + (1−α)·ema_{n−1}` seeded with `ema_0 = x_0`.
    #[default]
    Recursive,
    /// Normalised weights: `Σ(1−α)^i·x_{n−i} / Σ(1−α)^i` over the whole history.
    /// Converges to `Recursive` once the seed weight has decayed.
    Adjusted,
}

/// Exponential Moving Average over close prices.
///
/// No simple-moving-average seed: the first close starts the average and its
/// weight decays across the whole history, so the series is defined from
/// the first bar.
#[derive(Debug, Clone, Copy)]
pub struct EmaIndicator {
    pub span: usize,
    pub weighting: EmaWeighting,
}

impl EmaIndicator {
    pub fn new(span: usize, weighting: EmaWeighting) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self { span, weighting }
    }

    /// Smoothing factor α = 2 / (span + 1).
    pub fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }

    /// One EMA value per close (oldest first).
    pub fn series(&self, closes: &[f64]) -> Vec<f64> {
        let alpha = self.alpha();
        let decay = 1.0 - alpha;
        let mut out = Vec::with_capacity(closes.len());

        match self.weighting {
            EmaWeighting::Recursive => {
                let mut prev: Option<f64> = None;
                for &price in closes {
                    let value = match prev {
                        None => price,
                        Some(p) => alpha * price + decay * p,
                    };
                    out.push(value);
                    prev = Some(value);
                }
            }
            EmaWeighting::Adjusted => {
                let mut numerator = 0.0;
                let mut denominator = 0.0;
                for &price in closes {
                    numerator = price + decay * numerator;
                    denominator = 1.0 + decay * denominator;
                    out.push(numerator / denominator);
                }
            }
        }
        out
    }
}

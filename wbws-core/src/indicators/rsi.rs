//! Relative Strength Index (RSI).
//!
//! Gains and losses are smoothed recursively with `alpha = 1/period`, starting
//! at the first bar (whose gain and loss are zero):
//! `avg[t] = (1 - alpha) * avg[t-1] + alpha * x[t]`.
//! Values are published from bar `period - 1`, once `period` observations exist.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: avg_loss == 0 → RSI = 100 (flat series included); avg_gain == 0 → RSI = 0.
//! A missing close counts as no change for both deltas that touch it.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        let alpha = 1.0 / self.period as f64;
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for i in 0..n {
            let ch = match i {
                0 => 0.0,
                _ => bars[i].close - bars[i - 1].close,
            };
            let (gain, loss) = if ch.is_nan() {
                (0.0, 0.0)
            } else {
                (ch.max(0.0), (-ch).max(0.0))
            };

            avg_gain = (1.0 - alpha) * avg_gain + alpha * gain;
            avg_loss = (1.0 - alpha) * avg_loss + alpha * loss;

            if i + 1 >= self.period {
                result[i] = rsi_value(avg_gain, avg_loss);
            }
        }

        result
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

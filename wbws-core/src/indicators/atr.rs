//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! The first bar has no previous close, so its true range is high-low.
//! ATR uses Wilder smoothing (RMA, alpha = 1/period) seeded with the first
//! true range, with no warm-up floor.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    /// `period` is clamped to at least 1; configuration validation rejects 0
    /// before an `Atr` is ever built.
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Compute the True Range series from bars.
/// TR[0] is high-low (no previous close). Terms involving a NaN are skipped.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = vec![f64::NAN; bars.len()];

    if let Some(first) = bars.first() {
        tr[0] = first.high - first.low;
    }

    for (i, w) in bars.windows(2).enumerate() {
        let (prev, cur) = (&w[0], &w[1]);
        let (h, l, pc) = (cur.high, cur.low, prev.close);
        // f64::max ignores a NaN operand; all-NaN stays NaN.
        tr[i + 1] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

/// Wilder smoothing (RMA) of a series.
///
/// `rma[t] = alpha * x[t] + (1 - alpha) * rma[t-1]` with `alpha = 1/period`,
/// seeded with the first non-NaN value. Leading NaNs stay NaN; a NaN after the
/// seed holds the previous value.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 {
        return result;
    }

    let alpha = 1.0 / period as f64;
    let mut prev: Option<f64> = None;
    for (out, &v) in result.iter_mut().zip(values) {
        prev = match (prev, v.is_nan()) {
            (None, true) => None,
            (None, false) => Some(v),
            (Some(p), true) => Some(p),
            (Some(p), false) => Some(alpha * v + (1.0 - alpha) * p),
        };
        if let Some(p) = prev {
            *out = p;
        }
    }

    result
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        wilder_smooth(&true_range(bars), self.period)
    }
}

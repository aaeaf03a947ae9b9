//! Concrete indicator implementations.
//!
//! Every indicator implements the `Indicator` trait from `components::indicator`.
//! Series are computed once over the full bar history and looked up by bar index
//! (RSI) or by timestamp (ATR and annual range, inside the risk engine).

pub mod atr;
pub mod rolling_range;
pub mod rsi;

pub use atr::{true_range, wilder_smooth, Atr};
pub use rolling_range::{daily_extremes, AnnualRange, DailyExtreme, ANNUAL_MIN_DAYS, ANNUAL_WINDOW_DAYS};
pub use rsi::Rsi;

/// Create synthetic daily bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
/// One bar per calendar day starting 2024-01-02 at midnight.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    bars_from_closes(closes, |i| base + chrono::Duration::days(i as i64))
}

/// Same shape as [`make_bars`] but one bar per minute on 2024-01-02, starting
/// at `hour:minute`.
#[cfg(test)]
pub fn make_minute_bars(hour: u32, minute: u32, closes: &[f64]) -> Vec<crate::domain::Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap();
    bars_from_closes(closes, |i| base + chrono::Duration::minutes(i as i64))
}

#[cfg(test)]
fn bars_from_closes(
    closes: &[f64],
    timestamp: impl Fn(usize) -> chrono::NaiveDateTime,
) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: timestamp(i),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Daily bars from explicit `(open, high, low, close)` tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            timestamp: base + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

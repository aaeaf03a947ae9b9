//! Bar: the fundamental market data unit.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// OHLCV bar at a fixed base interval (typically one minute).
///
/// Timestamps are naive wall-clock times, already converted to the exchange's
/// local session time by the upstream aggregation stage. Nothing in the core
/// performs timezone conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// OHLCV sanity: `low <= min(open, close) <= max(open, close) <= high`,
    /// positive prices, non-negative volume.
    pub fn is_sane(&self) -> bool {
        if self.is_void() || !self.volume.is_finite() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
            && self.volume >= 0.0
    }

    /// Calendar date of the bar (session-local).
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Minutes since midnight of the bar's wall-clock time.
    pub fn minute_of_day(&self) -> u32 {
        self.timestamp.hour() * 60 + self.timestamp.minute()
    }
}

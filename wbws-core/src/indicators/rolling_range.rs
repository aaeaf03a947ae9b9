//! Rolling annual range: high minus low of the trailing trading days, as of
//! the prior day.
//!
//! Bars are aggregated into calendar days (max high, min low). For day `d` the
//! range covers days `d-window ..= d-1`; the current day never contributes.
//! The daily value is then carried onto every intraday bar of day `d`.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use chrono::NaiveDate;

/// Trading days in the trailing window.
pub const ANNUAL_WINDOW_DAYS: usize = 252;

/// Minimum number of prior days before a range is produced.
pub const ANNUAL_MIN_DAYS: usize = 20;

/// Daily aggregate of a run of bars sharing one calendar date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyExtreme {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
}

/// Aggregate chronologically sorted bars into per-day highs and lows.
///
/// NaN highs/lows are skipped; a day with no valid value keeps NaN.
pub fn daily_extremes(bars: &[Bar]) -> Vec<DailyExtreme> {
    let mut days: Vec<DailyExtreme> = Vec::new();
    for bar in bars {
        let date = bar.date();
        match days.last_mut() {
            Some(day) if day.date == date => {
                day.high = nan_max(day.high, bar.high);
                day.low = nan_min(day.low, bar.low);
            }
            _ => days.push(DailyExtreme {
                date,
                high: bar.high,
                low: bar.low,
            }),
        }
    }
    days
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        b
    } else if b.is_nan() {
        a
    } else {
        a.max(b)
    }
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        b
    } else if b.is_nan() {
        a
    } else {
        a.min(b)
    }
}

/// Range per day, shifted by one day. `None` until `min_days` valid prior days exist.
pub fn shifted_daily_range(days: &[DailyExtreme], window: usize, min_days: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; days.len()];
    for d in 1..days.len() {
        let start = d.saturating_sub(window);
        let prior = &days[start..d];

        let mut high = f64::NAN;
        let mut low = f64::NAN;
        let mut valid = 0usize;
        for day in prior {
            if day.high.is_nan() || day.low.is_nan() {
                continue;
            }
            high = nan_max(high, day.high);
            low = nan_min(low, day.low);
            valid += 1;
        }

        if valid >= min_days.max(1) {
            out[d] = Some(high - low);
        }
    }
    out
}

/// Annual range indicator: per-bar value of the prior-day trailing range.
#[derive(Debug, Clone)]
pub struct AnnualRange {
    window_days: usize,
    min_days: usize,
    name: String,
}

impl AnnualRange {
    pub fn new(window_days: usize, min_days: usize) -> Self {
        let window_days = window_days.max(1);
        Self {
            window_days,
            min_days: min_days.clamp(1, window_days),
            name: format!("annual_range_{window_days}"),
        }
    }
}

impl Default for AnnualRange {
    fn default() -> Self {
        Self::new(ANNUAL_WINDOW_DAYS, ANNUAL_MIN_DAYS)
    }
}

impl Indicator for AnnualRange {
    fn name(&self) -> &str {
        &self.name
    }

    /// Measured in days, not bars.
    fn lookback(&self) -> usize {
        self.min_days
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let days = daily_extremes(bars);
        let ranges = shifted_daily_range(&days, self.window_days, self.min_days);

        let mut result = Vec::with_capacity(bars.len());
        let mut day_idx = 0usize;
        for bar in bars {
            let date = bar.date();
            while day_idx + 1 < days.len() && days[day_idx].date != date {
                day_idx += 1;
            }
            result.push(ranges.get(day_idx).copied().flatten().unwrap_or(f64::NAN));
        }
        result
    }
}

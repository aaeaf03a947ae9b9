//! Higher-timeframe (HTF) trend bias.
//!
//! Base bars are grouped into calendar-aligned HTF buckets (origin = midnight
//! of the first bar's day). Each bucket's direction is derived from its first
//! open and last close, then broadcast back onto the base bars.

use crate::domain::Bar;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HtfPeriodError {
    #[error("HTF period is empty")]
    Empty,

    #[error("invalid HTF period multiplier in '{0}'")]
    InvalidNumber(String),

    #[error("unknown HTF period unit in '{0}' (expected min, T, H or D)")]
    UnknownUnit(String),

    #[error("HTF period must be positive, got '{0}'")]
    Zero(String),
}

/// Longest accepted bucket: 100 years of minutes. Keeps bucket arithmetic on
/// timestamps far from overflow.
pub const MAX_PERIOD_MINUTES: i64 = 100 * 366 * 24 * 60;

/// A higher-timeframe bucket length, stored in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HtfPeriod {
    minutes: i64,
}

impl HtfPeriod {
    pub fn from_minutes(minutes: i64) -> Result<Self, HtfPeriodError> {
        if minutes <= 0 {
            return Err(HtfPeriodError::Zero(format!("{minutes}min")));
        }
        if minutes > MAX_PERIOD_MINUTES {
            return Err(HtfPeriodError::InvalidNumber(format!("{minutes}min")));
        }
        Ok(Self { minutes })
    }

    /// Parse an offset alias such as `60min`, `30T`, `4H` or `1D`.
    /// A missing multiplier means 1 (`H` == `1H`).
    pub fn parse(s: &str) -> Result<Self, HtfPeriodError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HtfPeriodError::Empty);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);

        let multiplier: i64 = if number.is_empty() {
            1
        } else {
            number
                .parse()
                .map_err(|_| HtfPeriodError::InvalidNumber(s.to_string()))?
        };

        let unit_minutes = match unit {
            "min" | "T" | "m" => 1,
            "H" | "h" => 60,
            "D" | "d" => 24 * 60,
            _ => return Err(HtfPeriodError::UnknownUnit(s.to_string())),
        };

        if multiplier == 0 {
            return Err(HtfPeriodError::Zero(s.to_string()));
        }

        multiplier
            .checked_mul(unit_minutes)
            .filter(|m| *m <= MAX_PERIOD_MINUTES)
            .map(|minutes| Self { minutes })
            .ok_or_else(|| HtfPeriodError::InvalidNumber(s.to_string()))
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes)
    }
}

impl FromStr for HtfPeriod {
    type Err = HtfPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HtfPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}min", self.minutes)
    }
}

/// Direction of a single HTF bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HtfState {
    Bullish,
    Bearish,
    /// Open/close unavailable, flat bucket (`close == open`), or no bucket
    /// resolved yet.
    Neutral,
}

impl HtfState {
    pub fn from_open_close(open: Option<f64>, close: Option<f64>) -> Self {
        match (open, close) {
            (Some(o), Some(c)) if c > o => Self::Bullish,
            (Some(o), Some(c)) if c < o => Self::Bearish,
            _ => Self::Neutral,
        }
    }

    pub fn is_bull(self) -> bool {
        matches!(self, Self::Bullish)
    }

    pub fn is_bear(self) -> bool {
        matches!(self, Self::Bearish)
    }
}

/// When a bucket's state becomes visible to the base bars inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HtfAlignment {
    /// A base bar sees the state of the bucket it belongs to, labelled by the
    /// bucket start. The state uses the bucket's final close.
    #[default]
    BucketStart,
    /// A base bar only sees buckets that have fully closed (`start + period <= t`).
    BucketClose,
}

/// One aggregated HTF bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtfBucket {
    pub start: NaiveDateTime,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub bar_count: usize,
    pub state: HtfState,
}

/// Resolved HTF bias: the bucket list plus one state per base bar.
#[derive(Debug, Clone, Default)]
pub struct HtfSeries {
    pub buckets: Vec<HtfBucket>,
    pub per_bar: Vec<HtfState>,
}

impl HtfSeries {
    pub fn bull_count(&self) -> usize {
        self.per_bar.iter().filter(|s| s.is_bull()).count()
    }

    pub fn bear_count(&self) -> usize {
        self.per_bar.iter().filter(|s| s.is_bear()).count()
    }
}

/// Resamples base bars to the HTF and broadcasts bias back.
#[derive(Debug, Clone)]
pub struct HtfResolver {
    period: HtfPeriod,
    alignment: HtfAlignment,
}

impl HtfResolver {
    pub fn new(period: HtfPeriod, alignment: HtfAlignment) -> Self {
        Self { period, alignment }
    }

    pub fn period(&self) -> HtfPeriod {
        self.period
    }

    pub fn alignment(&self) -> HtfAlignment {
        self.alignment
    }

    /// Group bars into buckets. Bars must be sorted by timestamp.
    pub fn buckets(&self, bars: &[Bar]) -> Vec<HtfBucket> {
        let Some(first) = bars.first() else {
            return Vec::new();
        };
        let origin = first.date().and_hms_opt(0, 0, 0).unwrap_or(first.timestamp);

        let mut buckets: Vec<HtfBucket> = Vec::new();
        let mut current_key: Option<i64> = None;

        for bar in bars {
            let key = (bar.timestamp - origin).num_minutes().div_euclid(self.period.minutes);
            if current_key != Some(key) {
                current_key = Some(key);
                buckets.push(HtfBucket {
                    start: origin + Duration::minutes(key * self.period.minutes),
                    open: None,
                    close: None,
                    bar_count: 0,
                    state: HtfState::Neutral,
                });
            }
            if let Some(bucket) = buckets.last_mut() {
                // first valid open, last valid close
                if bucket.open.is_none() && !bar.open.is_nan() {
                    bucket.open = Some(bar.open);
                }
                if !bar.close.is_nan() {
                    bucket.close = Some(bar.close);
                }
                bucket.bar_count += 1;
            }
        }

        for bucket in &mut buckets {
            bucket.state = HtfState::from_open_close(bucket.open, bucket.close);
        }
        buckets
    }

    /// Resolve buckets and broadcast the bias onto every base bar.
    pub fn resolve(&self, bars: &[Bar]) -> HtfSeries {
        let buckets = self.buckets(bars);
        let period = self.period.duration();
        let mut per_bar = Vec::with_capacity(bars.len());

        // Latest bucket visible at the current bar, advanced monotonically.
        let mut visible: Option<usize> = None;
        let mut next = 0usize;

        for bar in bars {
            while next < buckets.len() {
                let reveal_at = match self.alignment {
                    HtfAlignment::BucketStart => buckets[next].start,
                    HtfAlignment::BucketClose => buckets[next].start + period,
                };
                if reveal_at <= bar.timestamp {
                    visible = Some(next);
                    next += 1;
                } else {
                    break;
                }
            }
            per_bar.push(match visible {
                Some(i) => buckets[i].state,
                None => HtfState::Neutral,
            });
        }

        HtfSeries { buckets, per_bar }
    }
}

//! Deterministic synthetic 1-minute bars for demos, tests and benchmarks.

use crate::domain::Bar;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub start_date: NaiveDate,
    /// Trading days to generate (weekends are skipped).
    pub days: usize,
    /// First bar of each day, minutes after midnight.
    pub day_start_minute: u32,
    pub bars_per_day: usize,
    pub start_price: f64,
    /// Per-bar relative move bound.
    pub volatility: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default(),
            days: 5,
            day_start_minute: 8 * 60,
            bars_per_day: 13 * 60,
            start_price: 18_000.0,
            volatility: 0.0008,
        }
    }
}

/// Random walk with wicks. The same config always yields the same bars.
pub fn generate_bars(config: &SyntheticConfig) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut bars = Vec::with_capacity(config.days * config.bars_per_day);
    let mut price = config.start_price.max(1.0);
    let vol = config.volatility.abs();

    let mut date = config.start_date;
    let mut produced_days = 0usize;
    while produced_days < config.days {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date = date.succ_opt().unwrap_or(date);
            continue;
        }

        let Some(day_open) = date.and_hms_opt(0, 0, 0) else {
            break;
        };
        let first: NaiveDateTime = day_open + Duration::minutes(config.day_start_minute as i64);

        for i in 0..config.bars_per_day {
            let open = price;
            let drift: f64 = rng.gen_range(-vol..=vol);
            let close = (open * (1.0 + drift)).max(0.01);
            let wick_up: f64 = rng.gen_range(0.0..=vol) * open;
            let wick_down: f64 = rng.gen_range(0.0..=vol) * open;
            let high = open.max(close) + wick_up;
            let low = (open.min(close) - wick_down).max(0.005);

            bars.push(Bar {
                timestamp: first + Duration::minutes(i as i64),
                open,
                high,
                low,
                close,
                volume: rng.gen_range(1..=500) as f64,
            });
            price = close;
        }

        produced_days += 1;
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    bars
}

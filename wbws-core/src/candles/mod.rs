//! Candle structure: per-bar classification and higher-timeframe bias.

pub mod classify;
pub mod htf;

pub use classify::{classify, classify_range, classify_series, CandleType};
pub use htf::{
    HtfAlignment, HtfBucket, HtfPeriod, HtfPeriodError, HtfResolver, HtfSeries, HtfState,
};

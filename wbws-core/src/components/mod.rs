//! Component traits and the WBWS stages built on them.
//!
//! - Signal generator: classifies candles, resolves HTF bias, emits raw signals
//! - Signal filter: gates raw signals (session window, RSI momentum)
//!
//! Plus the indicator trait for precomputed numeric series. Risk sizing lives
//! in `crate::risk`.

pub mod filter;
pub mod indicator;
pub mod signal;
pub mod trigger;

pub use filter::{RsiFilter, SessionFilter, SignalFilter};
pub use indicator::{Indicator, IndicatorValues};
pub use signal::{FilterVerdict, SignalDirection, SignalEvaluation, SignalEvent, SignalGenerator};
pub use trigger::{SignalFrame, SignalRow, WbwsTrigger};

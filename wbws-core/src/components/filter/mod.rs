//! Signal filters: gate raw signals on market conditions.
//!
//! Filters evaluate signal events and produce `SignalEvaluation` records.
//! A disabled filter passes every signal through.

pub mod rsi_filter;
pub mod session;

use crate::domain::Bar;

use super::indicator::{Indicator, IndicatorValues};
use super::signal::{SignalEvaluation, SignalEvent};

/// Trait for signal filters.
///
/// Filters gate signals on market conditions (session window, momentum).
/// They produce a `SignalEvaluation` record that captures the verdict and the
/// filter's state at evaluation time.
///
/// # Architecture invariant
/// A filter sees only `bars[0..=bar_index]` and indicator values at `bar_index`.
pub trait SignalFilter: Send + Sync {
    /// Human-readable name (e.g., "rsi_filter", "session_filter").
    fn name(&self) -> &str;

    /// Indicators that must be precomputed for this filter to evaluate.
    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        Vec::new()
    }

    /// Evaluate whether a signal should be allowed through.
    fn evaluate(
        &self,
        signal: &SignalEvent,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> SignalEvaluation;
}

pub use rsi_filter::RsiFilter;
pub use session::{SessionError, SessionFilter, SessionInfo, SessionTime};

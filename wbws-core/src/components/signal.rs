//! Signal generation: detects WBWS reversals, emits directional intent.
//!
//! Signal events are immutable once emitted. They describe a market event;
//! the filter chain and risk engine record their decisions separately.

use crate::domain::{Bar, SignalEventId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::trigger::SignalFrame;

/// Directional intent of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    Buy,
    Sell,
}

impl SignalDirection {
    pub fn is_long(self) -> bool {
        matches!(self, Self::Buy)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable market event emitted by the trigger.
///
/// `metadata` carries the signal bar's context (close, high, low) for the
/// downstream stages and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub id: SignalEventId,
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub direction: SignalDirection,
    pub metadata: HashMap<String, f64>,
}

impl SignalEvent {
    /// Build an event for `bars[bar_index]`, recording its close/high/low.
    pub fn at_bar(id: SignalEventId, bars: &[Bar], bar_index: usize, direction: SignalDirection) -> Option<Self> {
        let bar = bars.get(bar_index)?;
        let metadata = HashMap::from([
            ("close".to_string(), bar.close),
            ("high".to_string(), bar.high),
            ("low".to_string(), bar.low),
        ]);
        Some(Self {
            id,
            bar_index,
            timestamp: bar.timestamp,
            direction,
            metadata,
        })
    }

    /// Entry reference price: the signal bar's close.
    pub fn entry_price(&self) -> Option<f64> {
        self.metadata.get("close").copied().filter(|v| v.is_finite())
    }
}

/// Trait for signal generators.
///
/// # Architecture invariant
/// The row for bar `t` may only depend on `bars[0..=t]` plus, for HTF bias,
/// the bucket that `t` belongs to under the configured alignment.
pub trait SignalGenerator: Send + Sync {
    /// Human-readable name (e.g., "wbws_trigger").
    fn name(&self) -> &str;

    /// Scan the whole bar series once, producing the per-bar table and the
    /// raw signal events in chronological order.
    fn generate(&self, bars: &[Bar]) -> SignalFrame;
}

/// Record of a signal filter evaluating a signal event.
///
/// Kept separate from `SignalEvent` to preserve signal immutability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEvaluation {
    pub signal_event_id: SignalEventId,
    pub filter_name: String,
    pub verdict: FilterVerdict,
    /// Snapshot of the filter's state at evaluation time (e.g., current RSI value).
    pub filter_state: HashMap<String, f64>,
}

/// Outcome of a signal filter evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterVerdict {
    Passed,
    FilteredBySession,
    FilteredByMomentum,
    FilteredByCustom(String),
}

impl FilterVerdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

//! Pipeline orchestration and its outputs.

pub mod disposition;
pub mod orchestrator;
pub mod stats;

use crate::components::signal::SignalDirection;
use crate::domain::SignalEventId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use disposition::{Disposition, Stage, StageStep};
pub use orchestrator::{Pipeline, PipelineError, PipelineOutput, SignalOutcome};
pub use stats::{DirectionCounts, ExecutionStats, StageCounts};

/// One approved signal with its final stop and target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub signal_id: SignalEventId,
    pub timestamp: NaiveDateTime,
    pub direction: SignalDirection,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub stop_distance: f64,
    pub target_distance: f64,
    pub adjusted: bool,
    pub comment: String,
}

impl TradeRecord {
    pub fn from_outcome(outcome: &SignalOutcome) -> Option<Self> {
        match &outcome.disposition {
            Disposition::Approved {
                profile,
                adjusted,
                comment,
            } => Some(Self {
                signal_id: outcome.event.id,
                timestamp: outcome.event.timestamp,
                direction: outcome.event.direction,
                entry_price: profile.entry_price,
                stop_loss: profile.stop_loss,
                take_profit: profile.take_profit,
                stop_distance: profile.stop_distance,
                target_distance: profile.target_distance,
                adjusted: *adjusted,
                comment: comment.clone(),
            }),
            _ => None,
        }
    }
}

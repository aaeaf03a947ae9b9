//! Stop-loss / take-profit geometry of an approved signal.

use crate::components::signal::SignalDirection;
use serde::{Deserialize, Serialize};

/// Entry, stop and target of one trade. Built once; an adjusted stop produces
/// a new profile rather than mutating this one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub direction: SignalDirection,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub stop_distance: f64,
    pub target_distance: f64,
}

impl RiskProfile {
    /// Long: stop below, target above. Short mirrored.
    pub fn from_distance(
        direction: SignalDirection,
        entry_price: f64,
        stop_distance: f64,
        risk_to_reward: f64,
    ) -> Self {
        let target_distance = stop_distance * risk_to_reward;
        let (stop_loss, take_profit) = if direction.is_long() {
            (entry_price - stop_distance, entry_price + target_distance)
        } else {
            (entry_price + stop_distance, entry_price - target_distance)
        };
        Self {
            direction,
            entry_price,
            stop_loss,
            take_profit,
            stop_distance,
            target_distance,
        }
    }

    /// Replace the stop with one `stop_distance` away, keeping the same R:R.
    pub fn with_stop_distance(&self, stop_distance: f64) -> Self {
        Self::from_distance(
            self.direction,
            self.entry_price,
            stop_distance,
            self.risk_to_reward(),
        )
    }

    pub fn risk_to_reward(&self) -> f64 {
        if self.stop_distance > 0.0 {
            self.target_distance / self.stop_distance
        } else {
            0.0
        }
    }

    /// Stop on the losing side of entry, target on the winning side.
    pub fn is_consistent(&self) -> bool {
        if self.direction.is_long() {
            self.stop_loss <= self.entry_price && self.take_profit >= self.entry_price
        } else {
            self.stop_loss >= self.entry_price && self.take_profit <= self.entry_price
        }
    }
}

//! Per-stage execution counts, split by direction.

use crate::components::SignalDirection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::disposition::{Disposition, Stage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionCounts {
    pub buy: usize,
    pub sell: usize,
}

impl DirectionCounts {
    pub fn bump(&mut self, direction: SignalDirection) {
        match direction {
            SignalDirection::Buy => self.buy += 1,
            SignalDirection::Sell => self.sell += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.buy + self.sell
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub input: DirectionCounts,
    pub approved: DirectionCounts,
    pub rejected: DirectionCounts,
    /// Approved with a modified stop. Only the risk stage adjusts.
    pub adjusted: DirectionCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub trigger: StageCounts,
    pub time: StageCounts,
    pub momentum: StageCounts,
    pub risk: StageCounts,
    /// Rejections keyed by "stage: reason".
    pub rejection_reasons: BTreeMap<String, usize>,
}

impl ExecutionStats {
    pub fn stage(&self, stage: Stage) -> &StageCounts {
        match stage {
            Stage::Trigger => &self.trigger,
            Stage::Time => &self.time,
            Stage::Momentum => &self.momentum,
            Stage::Risk => &self.risk,
        }
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut StageCounts {
        match stage {
            Stage::Trigger => &mut self.trigger,
            Stage::Time => &mut self.time,
            Stage::Momentum => &mut self.momentum,
            Stage::Risk => &mut self.risk,
        }
    }

    /// Account for one signal's final disposition across every stage it reached.
    pub fn record(&mut self, direction: SignalDirection, disposition: &Disposition) {
        for stage in Stage::ALL {
            if !disposition.reached(stage) {
                break;
            }
            let counts = self.stage_mut(stage);
            counts.input.bump(direction);
            if disposition.passed(stage) {
                counts.approved.bump(direction);
            } else {
                counts.rejected.bump(direction);
            }
        }

        match disposition {
            Disposition::Approved { adjusted: true, .. } => self.risk.adjusted.bump(direction),
            Disposition::Rejected { stage, reason } => {
                *self
                    .rejection_reasons
                    .entry(format!("{stage}: {}", reason_key(reason)))
                    .or_insert(0) += 1;
            }
            _ => {}
        }
    }

    pub fn raw_signals(&self) -> DirectionCounts {
        self.trigger.approved
    }

    pub fn final_signals(&self) -> DirectionCounts {
        self.risk.approved
    }
}

/// Collapse numeric detail so reasons group ("Risk too high: 3.10% > ..." → "Risk too high").
fn reason_key(reason: &str) -> &str {
    reason.split(':').next().unwrap_or(reason).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskProfile;

    #[test]
    fn counts_follow_disposition() {
        let mut stats = ExecutionStats::default();
        let time_reject = Disposition::Rejected {
            stage: Stage::Time,
            reason: "outside session".into(),
        };
        let adjusted = Disposition::Approved {
            profile: RiskProfile::from_distance(SignalDirection::Sell, 100.0, 1.0, 2.0),
            adjusted: true,
            comment: "SL adjusted".into(),
        };
        let risk_reject = Disposition::Rejected {
            stage: Stage::Risk,
            reason: "Risk too high: 5.00% > max 2.00% of annual range".into(),
        };

        stats.record(SignalDirection::Buy, &time_reject);
        stats.record(SignalDirection::Sell, &adjusted);
        stats.record(SignalDirection::Buy, &risk_reject);

        assert_eq!(stats.trigger.input.total(), 3);
        assert_eq!(stats.raw_signals(), DirectionCounts { buy: 2, sell: 1 });
        assert_eq!(stats.time.rejected.buy, 1);
        assert_eq!(stats.time.approved.total(), 2);
        assert_eq!(stats.momentum.input.total(), 2);
        assert_eq!(stats.risk.rejected.buy, 1);
        assert_eq!(stats.risk.adjusted.sell, 1);
        assert_eq!(stats.final_signals(), DirectionCounts { buy: 0, sell: 1 });
        assert_eq!(stats.rejection_reasons["risk: Risk too high"], 1);
        assert_eq!(stats.rejection_reasons["time: outside session"], 1);
    }

    #[test]
    fn stage_totals_are_conserved() {
        let mut stats = ExecutionStats::default();
        stats.record(
            SignalDirection::Buy,
            &Disposition::Rejected {
                stage: Stage::Momentum,
                reason: "rsi".into(),
            },
        );
        for stage in Stage::ALL {
            let c = stats.stage(stage);
            assert_eq!(c.input.total(), c.approved.total() + c.rejected.total());
        }
    }
}

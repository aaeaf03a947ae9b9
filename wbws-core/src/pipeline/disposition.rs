//! Where a signal stands in the filter chain.

use crate::risk::RiskProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Trigger,
    Time,
    Momentum,
    Risk,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Trigger, Stage::Time, Stage::Momentum, Stage::Risk];

    pub fn label(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Time => "time",
            Self::Momentum => "momentum",
            Self::Risk => "risk",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a single stage decided.
#[derive(Debug, Clone, PartialEq)]
pub enum StageStep {
    Pass,
    Reject(String),
    Approve {
        profile: RiskProfile,
        adjusted: bool,
        comment: String,
    },
}

/// Lifecycle of a signal. `Rejected` and `Approved` are terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Disposition {
    Raw,
    Cleared {
        stage: Stage,
    },
    Rejected {
        stage: Stage,
        reason: String,
    },
    Approved {
        profile: RiskProfile,
        adjusted: bool,
        comment: String,
    },
}

impl Disposition {
    /// Run `stage` unless the signal already reached a terminal state.
    pub fn advance(self, stage: Stage, step: impl FnOnce() -> StageStep) -> Self {
        if self.is_terminal() {
            return self;
        }
        match step() {
            StageStep::Pass => Self::Cleared { stage },
            StageStep::Reject(reason) => Self::Rejected { stage, reason },
            StageStep::Approve {
                profile,
                adjusted,
                comment,
            } => Self::Approved {
                profile,
                adjusted,
                comment,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Approved { .. })
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }

    pub fn rejected_at(&self) -> Option<Stage> {
        match self {
            Self::Rejected { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the signal made it past `stage`.
    pub fn passed(&self, stage: Stage) -> bool {
        match self {
            Self::Raw => stage == Stage::Trigger,
            Self::Cleared { stage: s } => stage <= *s,
            Self::Rejected { stage: s, .. } => stage < *s,
            Self::Approved { .. } => true,
        }
    }

    /// Whether the signal was evaluated by `stage` at all.
    pub fn reached(&self, stage: Stage) -> bool {
        match self {
            Self::Raw => stage == Stage::Trigger,
            Self::Cleared { stage: s } => stage <= *s,
            Self::Rejected { stage: s, .. } => stage <= *s,
            Self::Approved { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::SignalDirection;

    fn profile() -> RiskProfile {
        RiskProfile::from_distance(SignalDirection::Buy, 100.0, 2.0, 2.0)
    }

    #[test]
    fn rejection_is_terminal() {
        let d = Disposition::Raw
            .advance(Stage::Time, || StageStep::Reject("outside session".into()))
            .advance(Stage::Momentum, || panic!("must not run after rejection"));
        assert_eq!(d.rejected_at(), Some(Stage::Time));
        assert!(d.reached(Stage::Time));
        assert!(!d.passed(Stage::Time));
        assert!(!d.reached(Stage::Momentum));
    }

    #[test]
    fn full_chain_approves() {
        let d = Disposition::Raw
            .advance(Stage::Time, || StageStep::Pass)
            .advance(Stage::Momentum, || StageStep::Pass)
            .advance(Stage::Risk, || StageStep::Approve {
                profile: profile(),
                adjusted: false,
                comment: "SL: 1.00% of annual range".into(),
            });
        assert!(d.is_approved());
        assert!(Stage::ALL.iter().all(|s| d.passed(*s)));
    }

    #[test]
    fn cleared_tracks_progress() {
        let d = Disposition::Raw.advance(Stage::Time, || StageStep::Pass);
        assert!(d.passed(Stage::Time));
        assert!(!d.reached(Stage::Momentum));
        assert!(!d.is_terminal());
    }
}

//! Risk engine: ATR-based stop/target sizing with an annual-range cap.
//!
//! Built once from the full bar history. Both series are looked up as-of a
//! timestamp (latest value at or before it), so a signal never sees data
//! from after its own bar.

use crate::components::indicator::Indicator;
use crate::components::signal::{SignalDirection, SignalEvent};
use crate::config::{RiskConfig, RiskManagementConfig, SlTpConfig};
use crate::domain::Bar;
use crate::indicators::{AnnualRange, Atr};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::profile::RiskProfile;

/// Why the risk stage refused a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRejection {
    SlTpDisabled,
    AtrUnavailable,
    EntryUnavailable,
    RiskTooHigh { risk_fraction: f64, max_fraction: f64 },
}

impl RiskRejection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SlTpDisabled => "sl_tp_disabled",
            Self::AtrUnavailable => "atr_unavailable",
            Self::EntryUnavailable => "entry_unavailable",
            Self::RiskTooHigh { .. } => "risk_too_high",
        }
    }
}

/// Result of checking a stop against the annual-range cap.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskValidation {
    pub can_trade: bool,
    /// The stop to use: unchanged, moved to the cap, or `None` when rejected.
    pub stop_loss: Option<f64>,
    pub adjusted: bool,
    /// Stop distance as a fraction of the annual range, when a range was available.
    pub risk_fraction: Option<f64>,
    pub comment: String,
}

/// Outcome of the risk stage for a single signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RiskDecision {
    Approved {
        profile: RiskProfile,
        comment: String,
    },
    Adjusted {
        profile: RiskProfile,
        original_stop: f64,
        comment: String,
    },
    Rejected {
        reason: RiskRejection,
        comment: String,
    },
}

impl RiskDecision {
    pub fn profile(&self) -> Option<&RiskProfile> {
        match self {
            Self::Approved { profile, .. } | Self::Adjusted { profile, .. } => Some(profile),
            Self::Rejected { .. } => None,
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            Self::Approved { comment, .. }
            | Self::Adjusted { comment, .. }
            | Self::Rejected { comment, .. } => comment,
        }
    }

    pub fn is_approved(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// The risk stage as seen by the pipeline.
pub trait RiskGate: Send + Sync {
    fn name(&self) -> &str;

    /// Size and validate a signal that survived the filters.
    fn assess(&self, signal: &SignalEvent) -> RiskDecision;
}

#[derive(Debug, Clone)]
pub struct RiskEngine {
    sl_tp: SlTpConfig,
    management: RiskManagementConfig,
    timestamps: Vec<NaiveDateTime>,
    atr: Vec<f64>,
    annual_range: Option<Vec<f64>>,
}

impl RiskEngine {
    /// ATR is computed only when SL/TP is enabled, the annual range only when
    /// risk management is enabled.
    pub fn new(history: &[Bar], config: &RiskConfig) -> Self {
        let timestamps = history.iter().map(|b| b.timestamp).collect();

        let atr = if config.sl_tp.enabled {
            Atr::new(config.sl_tp.atr_length).compute(history)
        } else {
            vec![f64::NAN; history.len()]
        };

        let annual_range = config
            .risk_management
            .enabled
            .then(|| AnnualRange::default().compute(history));

        tracing::info!(
            bars = history.len(),
            atr_length = config.sl_tp.atr_length,
            sl_tp = config.sl_tp.enabled,
            risk_management = config.risk_management.enabled,
            "risk engine initialised"
        );

        Self {
            sl_tp: config.sl_tp.clone(),
            management: config.risk_management.clone(),
            timestamps,
            atr,
            annual_range,
        }
    }

    /// Build from precomputed series aligned with `timestamps`.
    pub fn from_series(
        timestamps: Vec<NaiveDateTime>,
        atr: Vec<f64>,
        annual_range: Option<Vec<f64>>,
        config: &RiskConfig,
    ) -> Self {
        Self {
            sl_tp: config.sl_tp.clone(),
            management: config.risk_management.clone(),
            timestamps,
            atr,
            annual_range,
        }
    }

    fn as_of(&self, series: &[f64], timestamp: NaiveDateTime) -> Option<f64> {
        let idx = self.timestamps.partition_point(|t| *t <= timestamp);
        if idx == 0 {
            return None;
        }
        series.get(idx - 1).copied().filter(|v| !v.is_nan())
    }

    pub fn atr_at(&self, timestamp: NaiveDateTime) -> Option<f64> {
        self.as_of(&self.atr, timestamp)
    }

    pub fn annual_range_at(&self, timestamp: NaiveDateTime) -> Option<f64> {
        self.annual_range
            .as_deref()
            .and_then(|series| self.as_of(series, timestamp))
    }

    /// ATR-derived stop and target. `None` when SL/TP is disabled or the ATR
    /// is missing or non-positive.
    pub fn compute_stop_target(
        &self,
        entry_price: f64,
        is_long: bool,
        timestamp: NaiveDateTime,
    ) -> Option<RiskProfile> {
        if !self.sl_tp.enabled {
            tracing::debug!("SL/TP calculation skipped (disabled)");
            return None;
        }
        let atr = self.atr_at(timestamp).filter(|a| *a > 0.0)?;

        let direction = if is_long {
            SignalDirection::Buy
        } else {
            SignalDirection::Sell
        };
        Some(RiskProfile::from_distance(
            direction,
            entry_price,
            atr * self.sl_tp.sl_multiplier,
            self.sl_tp.risk_to_reward_ratio,
        ))
    }

    /// Check the stop distance against the annual-range cap.
    pub fn validate_risk(
        &self,
        entry_price: f64,
        stop_loss: f64,
        is_long: bool,
        timestamp: NaiveDateTime,
    ) -> RiskValidation {
        let pass = |comment: &str, risk_fraction| RiskValidation {
            can_trade: true,
            stop_loss: Some(stop_loss),
            adjusted: false,
            risk_fraction,
            comment: comment.to_string(),
        };

        if !self.management.enabled {
            return pass("Risk management disabled", None);
        }
        let Some(range) = self.annual_range_at(timestamp).filter(|r| *r > 0.0) else {
            tracing::debug!(%timestamp, "annual range not available for risk validation");
            return pass("Annual range not available", None);
        };

        let max = self.management.max_risk_percentile;
        let risk_fraction = (entry_price - stop_loss).abs() / range;

        if max >= 1.0 || risk_fraction <= max {
            let comment = format!("SL: {:.2}% of annual range", risk_fraction * 100.0);
            return pass(&comment, Some(risk_fraction));
        }

        if self.management.allow_exceed_limit {
            let distance = max * range;
            let adjusted_stop = if is_long {
                entry_price - distance
            } else {
                entry_price + distance
            };
            tracing::warn!(
                %timestamp,
                risk_pct = risk_fraction * 100.0,
                max_pct = max * 100.0,
                adjusted_stop,
                "stop adjusted to risk cap"
            );
            return RiskValidation {
                can_trade: true,
                stop_loss: Some(adjusted_stop),
                adjusted: true,
                risk_fraction: Some(risk_fraction),
                comment: format!(
                    "SL adjusted from {:.2}% to {:.2}% of annual range",
                    risk_fraction * 100.0,
                    max * 100.0
                ),
            };
        }

        tracing::warn!(
            %timestamp,
            risk_pct = risk_fraction * 100.0,
            max_pct = max * 100.0,
            "trade rejected: risk above cap"
        );
        RiskValidation {
            can_trade: false,
            stop_loss: None,
            adjusted: false,
            risk_fraction: Some(risk_fraction),
            comment: format!(
                "Risk too high: {:.2}% > max {:.2}% of annual range",
                risk_fraction * 100.0,
                max * 100.0
            ),
        }
    }
}

impl RiskGate for RiskEngine {
    fn name(&self) -> &str {
        "risk_engine"
    }

    fn assess(&self, signal: &SignalEvent) -> RiskDecision {
        let Some(entry) = signal.entry_price() else {
            return RiskDecision::Rejected {
                reason: RiskRejection::EntryUnavailable,
                comment: "Entry price not available".to_string(),
            };
        };
        let is_long = signal.direction.is_long();

        let Some(profile) = self.compute_stop_target(entry, is_long, signal.timestamp) else {
            let (reason, comment) = if self.sl_tp.enabled {
                (RiskRejection::AtrUnavailable, "ATR not available")
            } else {
                (RiskRejection::SlTpDisabled, "SL/TP disabled")
            };
            return RiskDecision::Rejected {
                reason,
                comment: comment.to_string(),
            };
        };

        let validation = self.validate_risk(entry, profile.stop_loss, is_long, signal.timestamp);
        match (validation.can_trade, validation.stop_loss) {
            (true, Some(stop)) if validation.adjusted => RiskDecision::Adjusted {
                profile: profile.with_stop_distance((entry - stop).abs()),
                original_stop: profile.stop_loss,
                comment: validation.comment,
            },
            (true, _) => RiskDecision::Approved {
                profile,
                comment: validation.comment,
            },
            (false, _) => RiskDecision::Rejected {
                reason: RiskRejection::RiskTooHigh {
                    risk_fraction: validation.risk_fraction.unwrap_or(f64::NAN),
                    max_fraction: self.management.max_risk_percentile,
                },
                comment: validation.comment,
            },
        }
    }
}

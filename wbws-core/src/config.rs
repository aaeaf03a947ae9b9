//! Strategy configuration: every tunable of the trigger, filters and risk engine.
//!
//! All sections are optional in TOML; missing keys take their defaults.
//!
//! ```toml
//! [indicator]
//! htf_period = "60min"
//!
//! [filters.rsi]
//! length = 14
//! overbought = 70.0
//! oversold = 30.0
//!
//! [time_filter]
//! session_start = { hour = 8, minute = 30 }
//! session_end = { hour = 20, minute = 30 }
//!
//! [risk.sl_tp]
//! atr_length = 14
//! sl_multiplier = 1.4
//! risk_to_reward_ratio = 2.0
//!
//! [risk.risk_management]
//! enabled = true
//! max_risk_percentile = 0.02
//! allow_exceed_limit = true
//! ```

use crate::candles::{HtfAlignment, HtfPeriod, HtfPeriodError};
use crate::components::filter::{RsiFilter, SessionError, SessionFilter, SessionTime};
use crate::components::trigger::WbwsTrigger;
use crate::domain::ConfigId;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid session window: {0}")]
    InvalidSession(#[from] SessionError),

    #[error("invalid HTF period: {0}")]
    InvalidHtfPeriod(#[from] HtfPeriodError),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub htf_period: String,
    pub htf_alignment: HtfAlignment,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            htf_period: "60min".to_string(),
            htf_alignment: HtfAlignment::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiConfig {
    pub enabled: bool,
    pub length: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            length: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    pub rsi: RsiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeFilterConfig {
    pub enabled: bool,
    pub session_start: SessionTime,
    pub session_end: SessionTime,
}

impl Default for TimeFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_start: SessionTime { hour: 8, minute: 30 },
            session_end: SessionTime { hour: 20, minute: 30 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlTpConfig {
    pub enabled: bool,
    pub atr_length: usize,
    pub sl_multiplier: f64,
    pub risk_to_reward_ratio: f64,
}

impl Default for SlTpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            atr_length: 14,
            sl_multiplier: 1.4,
            risk_to_reward_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskManagementConfig {
    pub enabled: bool,
    /// Maximum stop distance as a fraction of the annual range. `>= 1.0` disables the cap.
    pub max_risk_percentile: f64,
    pub allow_exceed_limit: bool,
}

impl Default for RiskManagementConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_risk_percentile: 1.0,
            allow_exceed_limit: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub sl_tp: SlTpConfig,
    pub risk_management: RiskManagementConfig,
}

/// Complete strategy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub indicator: IndicatorConfig,
    pub filters: FiltersConfig,
    pub time_filter: TimeFilterConfig,
    pub risk: RiskConfig,
}

impl StrategyConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every parameter; the first violation is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.htf_period()?;
        self.session_filter()?;

        let rsi = &self.filters.rsi;
        if rsi.length == 0 {
            return Err(invalid("filters.rsi.length", "must be >= 1"));
        }
        for (name, v) in [
            ("filters.rsi.overbought", rsi.overbought),
            ("filters.rsi.oversold", rsi.oversold),
        ] {
            if !(0.0..=100.0).contains(&v) {
                return Err(invalid(name, format!("{v} is outside [0, 100]")));
            }
        }
        if rsi.oversold >= rsi.overbought {
            return Err(invalid(
                "filters.rsi.oversold",
                format!("{} must be below overbought {}", rsi.oversold, rsi.overbought),
            ));
        }

        let sl_tp = &self.risk.sl_tp;
        if sl_tp.atr_length == 0 {
            return Err(invalid("risk.sl_tp.atr_length", "must be >= 1"));
        }
        for (name, v) in [
            ("risk.sl_tp.sl_multiplier", sl_tp.sl_multiplier),
            ("risk.sl_tp.risk_to_reward_ratio", sl_tp.risk_to_reward_ratio),
            (
                "risk.risk_management.max_risk_percentile",
                self.risk.risk_management.max_risk_percentile,
            ),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(invalid(name, format!("{v} must be a positive finite number")));
            }
        }

        Ok(())
    }

    pub fn htf_period(&self) -> Result<HtfPeriod, ConfigError> {
        Ok(HtfPeriod::parse(&self.indicator.htf_period)?)
    }

    pub fn trigger(&self) -> Result<WbwsTrigger, ConfigError> {
        Ok(WbwsTrigger::new(
            self.htf_period()?,
            self.indicator.htf_alignment,
        ))
    }

    pub fn session_filter(&self) -> Result<SessionFilter, ConfigError> {
        let tf = &self.time_filter;
        Ok(SessionFilter::new(tf.session_start, tf.session_end, tf.enabled)?)
    }

    pub fn rsi_filter(&self) -> RsiFilter {
        let rsi = &self.filters.rsi;
        RsiFilter::new(rsi.length, rsi.overbought, rsi.oversold, rsi.enabled)
    }

    /// BLAKE3 over the canonical JSON form. Field order is fixed by the struct
    /// definitions, so equal configs hash equally.
    pub fn config_hash(&self) -> ConfigId {
        // Serializing plain structs of numbers and strings cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        ConfigId::from_hash(blake3::hash(&json).to_hex().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_setup() {
        let c = StrategyConfig::default();
        assert_eq!(c.indicator.htf_period, "60min");
        assert_eq!(c.indicator.htf_alignment, HtfAlignment::BucketStart);
        assert!(c.filters.rsi.enabled);
        assert_eq!(c.filters.rsi.length, 14);
        assert_eq!(c.time_filter.session_start, SessionTime { hour: 8, minute: 30 });
        assert_eq!(c.risk.sl_tp.atr_length, 14);
        assert_eq!(c.risk.sl_tp.sl_multiplier, 1.4);
        assert!(!c.risk.risk_management.enabled);
        assert_eq!(c.risk.risk_management.max_risk_percentile, 1.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        let c = StrategyConfig::from_toml_str("").unwrap();
        assert_eq!(c, StrategyConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = StrategyConfig::from_toml_str(
            r#"
            [indicator]
            htf_period = "4H"
            htf_alignment = "bucket_close"

            [risk.risk_management]
            enabled = true
            max_risk_percentile = 0.02
            allow_exceed_limit = true
            "#,
        )
        .unwrap();
        assert_eq!(c.htf_period().unwrap().minutes(), 240);
        assert_eq!(c.indicator.htf_alignment, HtfAlignment::BucketClose);
        assert!(c.risk.risk_management.allow_exceed_limit);
        assert_eq!(c.risk.sl_tp.risk_to_reward_ratio, 2.0);
        assert_eq!(c.filters.rsi.overbought, 70.0);
    }

    #[test]
    fn invalid_session_is_config_error() {
        let err = StrategyConfig::from_toml_str(
            r#"
            [time_filter]
            session_start = { hour = 21, minute = 0 }
            session_end = { hour = 9, minute = 0 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSession(_)));
    }

    #[test]
    fn invalid_htf_period() {
        let mut c = StrategyConfig::default();
        c.indicator.htf_period = "sixty".into();
        assert!(matches!(c.validate(), Err(ConfigError::InvalidHtfPeriod(_))));
    }

    #[test]
    fn oversized_htf_period_is_config_error() {
        let mut c = StrategyConfig::default();
        c.indicator.htf_period = "99999999999999D".into();
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidHtfPeriod(HtfPeriodError::InvalidNumber(_)))
        ));
    }

    #[test]
    fn invalid_numeric_parameters() {
        let mut c = StrategyConfig::default();
        c.risk.sl_tp.sl_multiplier = 0.0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidParameter { name: "risk.sl_tp.sl_multiplier", .. })
        ));

        let mut c = StrategyConfig::default();
        c.filters.rsi.length = 0;
        assert!(c.validate().is_err());

        let mut c = StrategyConfig::default();
        c.filters.rsi.oversold = 80.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn malformed_toml() {
        let err = StrategyConfig::from_toml_str("[indicator\nhtf_period = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn config_hash_tracks_parameters() {
        let a = StrategyConfig::default();
        let mut b = StrategyConfig::default();
        assert_eq!(a.config_hash(), b.config_hash());
        b.risk.sl_tp.sl_multiplier = 1.5;
        assert_ne!(a.config_hash(), b.config_hash());
        assert_eq!(a.config_hash().0.len(), 64);
    }
}

//! Run configuration: what data to load, which strategy to run, where to write.
//!
//! One TOML file holds everything. The strategy sections (`[indicator]`,
//! `[filters.rsi]`, `[time_filter]`, `[risk.*]`) sit at the top level next to
//! the run-level `[asset]`, `[data]` and `[output]` sections.
//!
//! ```toml
//! name = "DAX 1m"
//!
//! [asset]
//! symbol = "DAX"
//!
//! [data]
//! file = "data/dax_1m.csv"
//! date_range = { start = "2024-01-02", end = "2024-03-28" }
//!
//! [indicator]
//! htf_period = "60min"
//!
//! [output]
//! outputs_dir = "outputs"
//! save_signals_csv = true
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use wbws_core::config::{ConfigError, StrategyConfig};
use wbws_core::data::DateRange;
use wbws_core::domain::{ConfigId, DatasetHash, RunId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRangeConfig {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV or Parquet file with one-minute bars.
    pub file: PathBuf,
    pub timeframe: String,
    pub date_range: DateRangeConfig,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            timeframe: "1min".to_string(),
            date_range: DateRangeConfig::default(),
        }
    }
}

impl DataConfig {
    pub fn date_range(&self) -> Result<DateRange, ConfigError> {
        DateRange::new(self.date_range.start, self.date_range.end).map_err(|e| {
            ConfigError::InvalidParameter {
                name: "data.date_range",
                reason: e.to_string(),
            }
        })
    }

    /// File extension, lowercased ("csv", "parquet").
    pub fn format(&self) -> String {
        self.file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub outputs_dir: PathBuf,
    /// Relative to `outputs_dir`.
    pub reports_dir: PathBuf,
    pub save_execution_report: bool,
    pub save_trades_csv: bool,
    pub save_signals_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            outputs_dir: PathBuf::from("outputs"),
            reports_dir: PathBuf::from("reports/WBWS"),
            save_execution_report: true,
            save_trades_csv: true,
            save_signals_csv: false,
        }
    }
}

impl OutputConfig {
    pub fn reports_path(&self) -> PathBuf {
        self.outputs_dir.join(&self.reports_dir)
    }

    pub fn signals_path(&self) -> PathBuf {
        self.outputs_dir.join("signals")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub name: String,
    pub description: String,
    pub asset: AssetConfig,
    pub data: DataConfig,
    #[serde(flatten)]
    pub strategy: StrategyConfig,
    pub output: OutputConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: "Unnamed".to_string(),
            description: String::new(),
            asset: AssetConfig::default(),
            data: DataConfig::default(),
            strategy: StrategyConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
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
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), name = %config.name, "run config loaded");
        Ok(config)
    }

    /// Strategy parameters plus the date window. The data file is checked at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;
        self.data.date_range()?;
        Ok(())
    }

    /// Content hash of the strategy and date window. Output paths are not part of it.
    pub fn config_id(&self) -> ConfigId {
        #[derive(Serialize)]
        struct Identity<'a> {
            strategy: &'a StrategyConfig,
            date_range: &'a DateRangeConfig,
        }
        let json = serde_json::to_vec(&Identity {
            strategy: &self.strategy,
            date_range: &self.data.date_range,
        })
        .unwrap_or_default();
        ConfigId::from_hash(blake3::hash(&json).to_hex().as_str())
    }

    pub fn run_id(&self, dataset_hash: &DatasetHash) -> RunId {
        RunId::new(self.config_id(), dataset_hash.clone())
    }

    pub fn symbol(&self) -> &str {
        if self.asset.symbol.is_empty() {
            "UNKNOWN"
        } else {
            &self.asset.symbol
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        name = "DAX 1m"
        description = "reversal trigger with filters"

        [asset]
        symbol = "DAX"
        exchange = "XETRA"

        [data]
        file = "data/dax.csv"
        date_range = { start = "2024-01-02", end = "2024-01-31" }

        [indicator]
        htf_period = "4h"

        [filters.rsi]
        length = 10

        [time_filter]
        enabled = false

        [risk.risk_management]
        enabled = true
        max_risk_percentile = 0.05

        [output]
        outputs_dir = "out"
        save_signals_csv = true
    "#;

    #[test]
    fn full_config_parses_with_flattened_strategy() {
        let cfg = RunConfig::from_toml_str(FULL).unwrap();
        assert_eq!(cfg.name, "DAX 1m");
        assert_eq!(cfg.symbol(), "DAX");
        assert_eq!(cfg.data.format(), "csv");
        assert_eq!(cfg.strategy.indicator.htf_period, "4h");
        assert_eq!(cfg.strategy.filters.rsi.length, 10);
        assert!(!cfg.strategy.time_filter.enabled);
        assert!(cfg.strategy.risk.risk_management.enabled);
        assert_eq!(cfg.output.reports_path(), PathBuf::from("out/reports/WBWS"));
        assert!(cfg.output.save_signals_csv);
    }

    #[test]
    fn empty_config_takes_defaults() {
        let cfg = RunConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.name, "Unnamed");
        assert_eq!(cfg.symbol(), "UNKNOWN");
        assert_eq!(cfg.strategy, StrategyConfig::default());
        assert!(cfg.output.save_execution_report);
        assert!(!cfg.output.save_signals_csv);
    }

    #[test]
    fn reversed_date_range_is_rejected() {
        let err = RunConfig::from_toml_str(
            r#"
            [data]
            date_range = { start = "2024-02-01", end = "2024-01-01" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "data.date_range",
                ..
            }
        ));
    }

    #[test]
    fn invalid_strategy_is_rejected() {
        let err = RunConfig::from_toml_str(
            r#"
            [filters.rsi]
            overbought = 20.0
            oversold = 30.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { .. }));
    }

    #[test]
    fn config_id_ignores_output_settings() {
        let a = RunConfig::default();
        let mut b = a.clone();
        b.output.outputs_dir = PathBuf::from("elsewhere");
        b.name = "renamed".into();
        assert_eq!(a.config_id(), b.config_id());

        let mut c = a.clone();
        c.strategy.filters.rsi.length = 21;
        assert_ne!(a.config_id(), c.config_id());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RunConfig::from_file(Path::new("/nonexistent/run.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

//! Sections shared by the trigger and strategy reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wbws_core::config::StrategyConfig;

use crate::config::{AssetConfig, RunConfig};
use crate::result::RunMetadata;

pub const TRIGGER_REPORT_TYPE: &str = "WBWS";
pub const STRATEGY_REPORT_TYPE: &str = "WBWS_STRATEGY";

/// Number of sample signals kept per direction.
pub const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub report_type: String,
    pub config_name: String,
    pub run_id: String,
    pub duration_secs: f64,
}

impl ReportMetadata {
    pub fn new(report_type: &str, metadata: &RunMetadata) -> Self {
        Self {
            generated_at: metadata.generated_at,
            report_type: report_type.to_string(),
            config_name: metadata.config_name.clone(),
            run_id: metadata.run_id.clone(),
            duration_secs: metadata.duration_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    /// File name only.
    pub file: String,
    pub timeframe: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfiguration {
    pub name: String,
    pub description: String,
    pub asset: AssetConfig,
    pub data: DataSummary,
    pub strategy: StrategyConfig,
}

impl ReportConfiguration {
    pub fn from_config(config: &RunConfig) -> Self {
        let file = config
            .data
            .file
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| "N/A".to_string());
        let format = match config.data.format() {
            f if f.is_empty() => "N/A".to_string(),
            f => f,
        };
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            asset: config.asset.clone(),
            data: DataSummary {
                file,
                timeframe: config.data.timeframe.clone(),
                format,
            },
            strategy: config.strategy.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountPct {
    pub count: usize,
    pub percentage: f64,
}

impl CountPct {
    /// `count` as a percentage of `of`; zero when `of` is zero.
    pub fn of(count: usize, of: usize) -> Self {
        Self {
            count,
            percentage: percent(count, of),
        }
    }
}

pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

//! Bar loading for the runner.
//!
//! The full file is kept as history so the risk engine's annual range can see
//! the days before the requested window. Signals are only generated on the
//! windowed slice.

use std::ops::Range;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wbws_core::data::{dataset_hash, load_bars, DataError, DateRange};
use wbws_core::domain::{Bar, DatasetHash};

use crate::config::DataConfig;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data file configured (set [data].file or pass --data)")]
    NoDataFile,

    #[error("no bars between {start:?} and {end:?}")]
    EmptyWindow {
        start: Option<chrono::NaiveDate>,
        end: Option<chrono::NaiveDate>,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Where the bars came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    File { path: PathBuf },
    Synthetic { seed: u64 },
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// What happened between reading the file and running the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingInfo {
    /// Bars in the run window.
    pub rows: usize,
    /// Bars in the loaded file.
    pub history_rows: usize,
    pub period: Option<Period>,
    pub preprocessing_steps: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedData {
    pub history: Vec<Bar>,
    pub window: Range<usize>,
    pub source: DataSource,
    /// Hash of the windowed bars.
    pub dataset_hash: DatasetHash,
    pub info: PreprocessingInfo,
}

impl LoadedData {
    /// Wrap already validated bars. Fails if the window selects nothing.
    pub fn from_bars(
        history: Vec<Bar>,
        range: DateRange,
        source: DataSource,
    ) -> Result<Self, LoadError> {
        let window = range.slice_bounds(&history);
        if window.is_empty() {
            return Err(LoadError::EmptyWindow {
                start: range.start,
                end: range.end,
            });
        }

        let bars = &history[window.clone()];
        let dataset_hash = dataset_hash(bars);
        let period = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some(Period {
                start: first.timestamp,
                end: last.timestamp,
            }),
            _ => None,
        };

        let mut steps = vec![
            format!("Loaded {} bars", history.len()),
            "Validated columns, chronology and OHLC consistency".to_string(),
        ];
        if range.start.is_some() || range.end.is_some() {
            steps.push(format!(
                "Date range {} to {}: {} bars kept",
                range.start.map_or("start".to_string(), |d| d.to_string()),
                range.end.map_or("end".to_string(), |d| d.to_string()),
                bars.len()
            ));
        }
        if window.start > 0 {
            steps.push(format!("{} prior bars kept as risk history", window.start));
        }

        let info = PreprocessingInfo {
            rows: bars.len(),
            history_rows: history.len(),
            period,
            preprocessing_steps: steps,
        };

        Ok(Self {
            history,
            window,
            source,
            dataset_hash,
            info,
        })
    }

    /// The bars signals are generated on.
    pub fn bars(&self) -> &[Bar] {
        &self.history[self.window.clone()]
    }

    /// Bars up to the end of the window. Later bars must never reach the risk engine.
    pub fn risk_history(&self) -> &[Bar] {
        &self.history[..self.window.end]
    }
}

/// Read and validate the configured data file, then select the date window.
pub fn load_data(config: &DataConfig) -> Result<LoadedData, LoadError> {
    if config.file.as_os_str().is_empty() {
        return Err(LoadError::NoDataFile);
    }
    let range = DateRange::new(config.date_range.start, config.date_range.end)?;
    let history = load_bars(&config.file)?;
    let loaded = LoadedData::from_bars(
        history,
        range,
        DataSource::File {
            path: config.file.clone(),
        },
    )?;
    tracing::info!(
        file = %config.file.display(),
        rows = loaded.info.rows,
        history_rows = loaded.info.history_rows,
        dataset_hash = %loaded.dataset_hash,
        "data loaded"
    );
    Ok(loaded)
}

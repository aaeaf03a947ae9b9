//! Bar table contract: required columns and per-row invariants.
//!
//! - Columns: timestamp, open, high, low, close, volume (header case ignored)
//! - Sort order: strictly ascending timestamps, no duplicates
//! - Prices finite and positive; `low <= min(open, close) <= max(open, close) <= high`
//!
//! Any violation is fatal before a single signal is computed.

use crate::domain::Bar;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Required columns in canonical order.
pub const REQUIRED_COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("non-numeric value in column '{column}' at row {row}: '{value}'")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("unparsable timestamp at row {row}: '{value}'")]
    BadTimestamp { row: usize, value: String },

    #[error("non-finite {column} at row {row}")]
    NonFinite { column: &'static str, row: usize },

    #[error("timestamps not chronological at row {row}: {current} after {previous}")]
    NonChronological {
        row: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("duplicate timestamp {timestamp} at row {row}")]
    DuplicateTimestamp { row: usize, timestamp: NaiveDateTime },

    #[error("OHLC invariant violated at row {row} ({timestamp})")]
    InvalidBar { row: usize, timestamp: NaiveDateTime },
}

/// Map each required column to its position in `headers`, ignoring case and
/// surrounding whitespace.
pub fn resolve_columns<'a, I>(headers: I) -> Result<HashMap<&'static str, usize>, SchemaError>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized: Vec<String> = headers
        .into_iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    REQUIRED_COLUMNS
        .iter()
        .map(|&required| {
            normalized
                .iter()
                .position(|h| h == required)
                .map(|idx| (required, idx))
                .ok_or_else(|| SchemaError::MissingColumn(required.to_string()))
        })
        .collect()
}

/// Validate a loaded bar sequence. An empty sequence is valid.
pub fn validate_bars(bars: &[Bar]) -> Result<(), SchemaError> {
    for (row, bar) in bars.iter().enumerate() {
        for (column, v) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
            ("volume", bar.volume),
        ] {
            if !v.is_finite() {
                return Err(SchemaError::NonFinite { column, row });
            }
        }

        if !bar.is_sane() {
            return Err(SchemaError::InvalidBar {
                row,
                timestamp: bar.timestamp,
            });
        }

        if row > 0 {
            let previous = bars[row - 1].timestamp;
            if bar.timestamp == previous {
                return Err(SchemaError::DuplicateTimestamp {
                    row,
                    timestamp: bar.timestamp,
                });
            }
            if bar.timestamp < previous {
                return Err(SchemaError::NonChronological {
                    row,
                    previous,
                    current: bar.timestamp,
                });
            }
        }
    }
    Ok(())
}

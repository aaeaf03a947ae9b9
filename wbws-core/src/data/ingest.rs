//! Bar ingestion from CSV and Parquet files.
//!
//! Both readers produce validated, chronologically sorted bars. Timestamps are
//! read as naive wall-clock times; an explicit UTC offset is dropped, keeping
//! the local clock reading.

use crate::data::schema::{resolve_columns, validate_bars, SchemaError, REQUIRED_COLUMNS};
use crate::domain::{Bar, DatasetHash};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(String),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("unsupported data format '{0}' (expected .csv or .parquet)")]
    UnsupportedFormat(String),

    #[error("date range start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("no bars in {0}")]
    Empty(String),
}

/// Inclusive calendar-date window. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, DataError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(DataError::InvalidDateRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// Index range of `bars` (sorted) that falls inside the window.
    pub fn slice_bounds(&self, bars: &[Bar]) -> std::ops::Range<usize> {
        let lo = match self.start {
            Some(s) => bars.partition_point(|b| b.date() < s),
            None => 0,
        };
        let hi = match self.end {
            Some(e) => bars.partition_point(|b| b.date() <= e),
            None => bars.len(),
        };
        lo..hi.max(lo)
    }

    pub fn apply<'a>(&self, bars: &'a [Bar]) -> &'a [Bar] {
        &bars[self.slice_bounds(bars)]
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a timestamp in any of the common ISO-like layouts, or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
        .or_else(|| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z").ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_number(column: &str, row: usize, raw: &str) -> Result<f64, SchemaError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| SchemaError::NonNumeric {
            column: column.to_string(),
            row,
            value: raw.to_string(),
        })
}

/// Read bars from any CSV source with a header row.
pub fn read_csv_bars<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let cols = resolve_columns(headers.iter())?;

    let mut bars = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let field = |name: &str| record.get(cols[name]).unwrap_or("");

        let ts_raw = field("timestamp");
        let timestamp = parse_timestamp(ts_raw).ok_or_else(|| SchemaError::BadTimestamp {
            row,
            value: ts_raw.to_string(),
        })?;

        bars.push(Bar {
            timestamp,
            open: parse_number("open", row, field("open"))?,
            high: parse_number("high", row, field("high"))?,
            low: parse_number("low", row, field("low"))?,
            close: parse_number("close", row, field("close"))?,
            volume: parse_number("volume", row, field("volume"))?,
        });
    }

    validate_bars(&bars)?;
    Ok(bars)
}

pub fn load_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv_bars(std::io::BufReader::new(file))
}

pub fn load_parquet(path: &Path) -> Result<Vec<Bar>, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::Parquet(format!("read: {e}")))?;
    let bars = dataframe_to_bars(&df)?;
    validate_bars(&bars)?;
    Ok(bars)
}

/// Dispatch on file extension.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let bars = match ext.as_str() {
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    if bars.is_empty() {
        return Err(DataError::Empty(path.display().to_string()));
    }
    tracing::info!(
        path = %path.display(),
        bars = bars.len(),
        first = %bars[0].timestamp,
        last = %bars[bars.len() - 1].timestamp,
        "bars loaded"
    );
    Ok(bars)
}

fn find_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, DataError> {
    df.get_columns()
        .iter()
        .find(|c| c.name().as_str().trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()).into())
}

fn f64_values(df: &DataFrame, name: &'static str) -> Result<Vec<f64>, DataError> {
    let col = find_column(df, name)?
        .cast(&DataType::Float64)
        .map_err(|e| DataError::Parquet(format!("{name} column type: {e}")))?;
    let ca = col
        .f64()
        .map_err(|e| DataError::Parquet(format!("{name} column type: {e}")))?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn timestamp_values(df: &DataFrame) -> Result<Vec<NaiveDateTime>, DataError> {
    let col = find_column(df, "timestamp")?;
    let n = df.height();

    match col.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = col
                .cast(&DataType::Int64)
                .map_err(|e| DataError::Parquet(format!("timestamp cast: {e}")))?;
            let ca = raw
                .i64()
                .map_err(|e| DataError::Parquet(format!("timestamp column type: {e}")))?;
            (0..n)
                .map(|row| -> Result<NaiveDateTime, DataError> {
                    let v = ca.get(row).ok_or_else(|| SchemaError::BadTimestamp {
                        row,
                        value: "null".into(),
                    })?;
                    let per_second: i64 = match unit {
                        TimeUnit::Nanoseconds => 1_000_000_000,
                        TimeUnit::Microseconds => 1_000_000,
                        TimeUnit::Milliseconds => 1_000,
                    };
                    let nanos = v.rem_euclid(per_second) * (1_000_000_000 / per_second);
                    let dt = DateTime::from_timestamp(v.div_euclid(per_second), nanos as u32);
                    dt.map(|d| d.naive_utc()).ok_or_else(|| {
                        SchemaError::BadTimestamp {
                            row,
                            value: v.to_string(),
                        }
                        .into()
                    })
                })
                .collect()
        }
        DataType::String => {
            let ca = col
                .str()
                .map_err(|e| DataError::Parquet(format!("timestamp column type: {e}")))?;
            (0..n)
                .map(|row| -> Result<NaiveDateTime, DataError> {
                    let raw = ca.get(row).unwrap_or("");
                    parse_timestamp(raw).ok_or_else(|| {
                        SchemaError::BadTimestamp {
                            row,
                            value: raw.to_string(),
                        }
                        .into()
                    })
                })
                .collect()
        }
        other => Err(DataError::Parquet(format!(
            "timestamp column has unsupported type {other:?}"
        ))),
    }
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<Bar>, DataError> {
    let timestamps = timestamp_values(df)?;
    let opens = f64_values(df, "open")?;
    let highs = f64_values(df, "high")?;
    let lows = f64_values(df, "low")?;
    let closes = f64_values(df, "close")?;
    let volumes = f64_values(df, "volume")?;

    Ok(timestamps
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| Bar {
            timestamp,
            open: opens[i],
            high: highs[i],
            low: lows[i],
            close: closes[i],
            volume: volumes[i],
        })
        .collect())
}

/// Build a DataFrame with the canonical columns (timestamp as Datetime[ms]).
pub fn bars_to_dataframe(bars: &[Bar]) -> Result<DataFrame, DataError> {
    let millis: Vec<i64> = bars
        .iter()
        .map(|b| b.timestamp.and_utc().timestamp_millis())
        .collect();

    DataFrame::new(vec![
        Column::new("timestamp".into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .map_err(|e| DataError::Parquet(format!("timestamp cast: {e}")))?,
        Column::new("open".into(), bars.iter().map(|b| b.open).collect::<Vec<_>>()),
        Column::new("high".into(), bars.iter().map(|b| b.high).collect::<Vec<_>>()),
        Column::new("low".into(), bars.iter().map(|b| b.low).collect::<Vec<_>>()),
        Column::new("close".into(), bars.iter().map(|b| b.close).collect::<Vec<_>>()),
        Column::new("volume".into(), bars.iter().map(|b| b.volume).collect::<Vec<_>>()),
    ])
    .map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))
}

pub fn write_parquet(bars: &[Bar], path: &Path) -> Result<(), DataError> {
    let mut df = bars_to_dataframe(bars)?;
    let file = std::fs::File::create(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

/// Write bars as CSV with the canonical lowercase header.
pub fn write_csv(bars: &[Bar], path: &Path) -> Result<(), DataError> {
    let file = std::fs::File::create(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut wtr = csv::Writer::from_writer(std::io::BufWriter::new(file));
    wtr.write_record(REQUIRED_COLUMNS)?;
    for bar in bars {
        wtr.write_record([
            bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    wtr.flush().map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

/// Content hash over every bar field, in order.
pub fn dataset_hash(bars: &[Bar]) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(&bar.timestamp.and_utc().timestamp().to_le_bytes());
        for v in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
            hasher.update(&v.to_le_bytes());
        }
    }
    DatasetHash::from_hash(hasher.finalize().to_hex().as_str())
}

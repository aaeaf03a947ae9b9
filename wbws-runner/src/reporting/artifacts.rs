//! Report and table writers (JSON, CSV).

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use wbws_core::components::SignalRow;
use wbws_core::pipeline::TradeRecord;

/// Paths written by one export.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPaths {
    pub report_json: Option<PathBuf>,
    pub report_markdown: Option<PathBuf>,
    pub trades_csv: Option<PathBuf>,
    pub signals_csv: Option<PathBuf>,
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report {}", path.display()))
}

#[derive(Serialize)]
struct TradeCsvRow<'a> {
    signal_id: u64,
    timestamp: String,
    direction: &'static str,
    entry_price: f64,
    stop_loss: f64,
    take_profit: f64,
    stop_distance: f64,
    target_distance: f64,
    adjusted: bool,
    comment: &'a str,
}

pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create trades CSV {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for t in trades {
        wtr.serialize(TradeCsvRow {
            signal_id: t.signal_id.0,
            timestamp: t.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            direction: t.direction.label(),
            entry_price: t.entry_price,
            stop_loss: t.stop_loss,
            take_profit: t.take_profit,
            stop_distance: t.stop_distance,
            target_distance: t.target_distance,
            adjusted: t.adjusted,
            comment: &t.comment,
        })?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write trades CSV {}", path.display()))?;
    Ok(())
}

#[derive(Serialize)]
struct SignalCsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    /// Empty for unclassified bars.
    candle_type: Option<i8>,
    we_buy: bool,
    we_sell: bool,
}

/// Per-bar signal table.
pub fn write_signals_csv(path: &Path, rows: &[SignalRow]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create signals CSV {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for r in rows {
        wtr.serialize(SignalCsvRow {
            timestamp: r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
            candle_type: r.candle_type.code(),
            we_buy: r.we_buy,
            we_sell: r.we_sell,
        })?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write signals CSV {}", path.display()))?;
    Ok(())
}

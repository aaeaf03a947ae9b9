//! Reporting and artifact export.

pub mod artifacts;
pub mod common;
pub mod markdown;
pub mod strategy_report;
pub mod trigger_report;

use anyhow::Result;

pub use artifacts::ArtifactPaths;
pub use markdown::{convert_report_file, MarkdownReportGenerator};
pub use strategy_report::StrategyReport;
pub use trigger_report::TriggerReport;

use crate::result::{StrategyRun, TriggerRun};

/// Write the trigger report and the optional signals table, as configured in `[output]`.
pub fn export_trigger_run(run: &TriggerRun, with_markdown: bool) -> Result<ArtifactPaths> {
    let output = &run.config.output;
    let id = &run.metadata.run_id;
    let mut paths = ArtifactPaths::default();

    if output.save_execution_report {
        let dir = output.reports_path();
        artifacts::ensure_dir(&dir)?;
        let report = TriggerReport::from_run(run);
        let json_path = dir.join(format!("execution_{id}.json"));
        artifacts::write_json(&json_path, &report)?;
        if with_markdown {
            let md_path = json_path.with_extension("md");
            std::fs::write(&md_path, MarkdownReportGenerator.trigger(&report))?;
            paths.report_markdown = Some(md_path);
        }
        paths.report_json = Some(json_path);
    }

    if output.save_signals_csv {
        paths.signals_csv = Some(write_signals(run.config.symbol(), id, output, &run.frame.rows)?);
    }

    log_paths(&paths);
    Ok(paths)
}

/// Write the strategy report, trades table and optional signals table.
pub fn export_strategy_run(run: &StrategyRun, with_markdown: bool) -> Result<ArtifactPaths> {
    let output = &run.config.output;
    let id = &run.metadata.run_id;
    let mut paths = ArtifactPaths::default();

    if output.save_execution_report || output.save_trades_csv {
        artifacts::ensure_dir(&output.reports_path())?;
    }

    if output.save_execution_report {
        let report = StrategyReport::from_run(run);
        let json_path = output.reports_path().join(format!("strategy_report_{id}.json"));
        artifacts::write_json(&json_path, &report)?;
        if with_markdown {
            let md_path = json_path.with_extension("md");
            std::fs::write(&md_path, MarkdownReportGenerator.strategy(&report))?;
            paths.report_markdown = Some(md_path);
        }
        paths.report_json = Some(json_path);
    }

    if output.save_trades_csv {
        let trades_path = output.reports_path().join(format!("trades_{id}.csv"));
        artifacts::write_trades_csv(&trades_path, &run.output.trades)?;
        paths.trades_csv = Some(trades_path);
    }

    if output.save_signals_csv {
        paths.signals_csv = Some(write_signals(
            run.config.symbol(),
            id,
            output,
            &run.output.frame.rows,
        )?);
    }

    log_paths(&paths);
    Ok(paths)
}

fn write_signals(
    symbol: &str,
    id: &str,
    output: &crate::config::OutputConfig,
    rows: &[wbws_core::components::SignalRow],
) -> Result<std::path::PathBuf> {
    let dir = output.signals_path();
    artifacts::ensure_dir(&dir)?;
    let path = dir.join(format!("signals_{symbol}_{id}.csv"));
    artifacts::write_signals_csv(&path, rows)?;
    Ok(path)
}

fn log_paths(paths: &ArtifactPaths) {
    for path in [
        &paths.report_json,
        &paths.report_markdown,
        &paths.trades_csv,
        &paths.signals_csv,
    ]
    .into_iter()
    .flatten()
    {
        tracing::info!(path = %path.display(), "artifact written");
    }
}

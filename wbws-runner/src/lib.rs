//! WBWS runner: data loading, trigger and strategy runs, reports.
//!
//! This crate builds on `wbws-core` to provide:
//! - Run configuration (strategy plus data, asset and output sections)
//! - Data loading with a date window over the full history
//! - Trigger-only and full-pipeline runs with content-addressed run ids
//! - JSON reports, trades and signals CSV, Markdown conversion

pub mod config;
pub mod data_loader;
pub mod reporting;
pub mod result;
pub mod runner;

pub use config::{AssetConfig, DataConfig, DateRangeConfig, OutputConfig, RunConfig};
pub use data_loader::{load_data, DataSource, LoadError, LoadedData, PreprocessingInfo};
pub use reporting::{
    convert_report_file, export_strategy_run, export_trigger_run, ArtifactPaths,
    MarkdownReportGenerator, StrategyReport, TriggerReport,
};
pub use result::{RunMetadata, SignalCounts, StrategyRun, TriggerExecution, TriggerRun};
pub use runner::{run_strategy, run_strategy_on, run_trigger, run_trigger_on, RunError};

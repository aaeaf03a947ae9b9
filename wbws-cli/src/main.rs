//! WBWS CLI: trigger scans, strategy runs and report tooling.
//!
//! Commands:
//! - `trigger`: classify candles, resolve the HTF bias and report raw signals
//! - `run`: full pipeline (session, RSI, risk) with trades and reports
//! - `validate`: check a run config and, optionally, its data file
//! - `report-md`: convert a JSON report to Markdown
//! - `synth`: write a deterministic synthetic one-minute bar file

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wbws_core::data::{generate_bars, load_bars, write_csv, write_parquet, SyntheticConfig};
use wbws_runner::{
    convert_report_file, export_strategy_run, export_trigger_run, run_strategy, run_trigger,
    RunConfig, StrategyRun, TriggerRun,
};

#[derive(Parser)]
#[command(name = "wbws", about = "WBWS reversal signal pipeline", version)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Config plus command-line overrides shared by `trigger` and `run`.
#[derive(Args)]
struct RunArgs {
    /// Path to a TOML run config.
    #[arg(long)]
    config: PathBuf,

    /// Data file (CSV or Parquet). Overrides [data].file.
    #[arg(long)]
    data: Option<PathBuf>,

    /// First day of the window (YYYY-MM-DD), inclusive.
    #[arg(long)]
    start: Option<String>,

    /// Last day of the window (YYYY-MM-DD), inclusive.
    #[arg(long)]
    end: Option<String>,

    /// Output directory. Overrides [output].outputs_dir.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also write the per-bar signals CSV.
    #[arg(long, default_value_t = false)]
    signals_csv: bool,

    /// Also render the report as Markdown.
    #[arg(long, default_value_t = false)]
    markdown: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trigger only and write the execution report.
    Trigger(RunArgs),
    /// Run the full pipeline and write the strategy report and trades.
    Run(RunArgs),
    /// Validate a run config, and its data file if one is configured.
    Validate {
        #[arg(long)]
        config: PathBuf,

        /// Data file to check instead of [data].file.
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Convert a JSON report to Markdown.
    ReportMd {
        /// Report JSON written by `trigger` or `run`.
        input: PathBuf,

        /// Output path. Defaults to the input with a .md extension.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write synthetic one-minute bars (CSV or Parquet, by extension).
    Synth {
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value_t = 5)]
        days: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 780)]
        bars_per_day: usize,

        /// First calendar day (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Trigger(args) => run_trigger_cmd(&args),
        Commands::Run(args) => run_strategy_cmd(&args),
        Commands::Validate { config, data } => run_validate(config, data),
        Commands::ReportMd { input, output } => {
            let out = convert_report_file(&input, output.as_deref())?;
            println!("Markdown report written: {}", out.display());
            Ok(())
        }
        Commands::Synth {
            out,
            days,
            seed,
            bars_per_day,
            start,
        } => run_synth(out, days, seed, bars_per_day, start),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default = format!("wbws={level},wbws_core={level},wbws_runner={level}");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date '{s}'"))
}

fn load_config(args: &RunArgs) -> Result<RunConfig> {
    let mut config = RunConfig::from_file(&args.config)?;
    if let Some(data) = &args.data {
        config.data.file = data.clone();
    }
    if let Some(start) = &args.start {
        config.data.date_range.start = Some(parse_date(start)?);
    }
    if let Some(end) = &args.end {
        config.data.date_range.end = Some(parse_date(end)?);
    }
    if let Some(dir) = &args.output_dir {
        config.output.outputs_dir = dir.clone();
    }
    if args.signals_csv {
        config.output.save_signals_csv = true;
    }
    config.validate()?;
    tracing::debug!(
        config = %args.config.display(),
        data = %config.data.file.display(),
        outputs = %config.output.outputs_dir.display(),
        "run config resolved"
    );
    Ok(config)
}

fn run_trigger_cmd(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;
    let run = run_trigger(&config)?;
    let paths = export_trigger_run(&run, args.markdown)?;
    print_trigger(&run);
    if let Some(report) = paths.report_json {
        println!("Report:         {}", report.display());
    }
    if let Some(signals) = paths.signals_csv {
        println!("Signals CSV:    {}", signals.display());
    }
    Ok(())
}

fn run_strategy_cmd(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;
    let run = run_strategy(&config)?;
    let paths = export_strategy_run(&run, args.markdown)?;
    print_strategy(&run);
    if let Some(report) = paths.report_json {
        println!("Report:         {}", report.display());
    }
    if let Some(trades) = paths.trades_csv {
        println!("Trades CSV:     {}", trades.display());
    }
    Ok(())
}

fn run_validate(config_path: PathBuf, data: Option<PathBuf>) -> Result<()> {
    let config = RunConfig::from_file(&config_path)?;
    println!("Config OK: {} ({})", config.name, config_path.display());
    println!("Config ID: {}", config.config_id());

    let file = data.unwrap_or_else(|| config.data.file.clone());
    if file.as_os_str().is_empty() {
        println!("No data file configured; skipping data validation.");
        return Ok(());
    }
    let bars = load_bars(&file)?;
    let range = config.data.date_range()?;
    let window = range.apply(&bars);
    if window.is_empty() {
        bail!("{} has no bars inside the configured date range", file.display());
    }
    println!("Data OK: {} bars in {}", bars.len(), file.display());
    println!(
        "Window: {} bars, {} → {}",
        window.len(),
        window[0].timestamp,
        window[window.len() - 1].timestamp
    );
    Ok(())
}

fn run_synth(
    out: PathBuf,
    days: usize,
    seed: u64,
    bars_per_day: usize,
    start: Option<String>,
) -> Result<()> {
    let mut cfg = SyntheticConfig {
        seed,
        days,
        bars_per_day,
        ..Default::default()
    };
    if let Some(start) = start {
        cfg.start_date = parse_date(&start)?;
    }
    let bars = generate_bars(&cfg);

    let ext = out
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => write_csv(&bars, &out)?,
        "parquet" | "pq" => write_parquet(&bars, &out)?,
        other => bail!("Unsupported output format '{other}' (use .csv or .parquet)"),
    }
    println!("Wrote {} synthetic bars to {}", bars.len(), out.display());
    Ok(())
}

fn print_trigger(run: &TriggerRun) {
    let ex = &run.execution;
    println!();
    println!("=== Trigger Result ===");
    println!("Config:         {}", run.metadata.config_name);
    println!("Run ID:         {}", run.metadata.run_id);
    println!("HTF Period:     {}", ex.htf_period);
    println!("Bars Processed: {}", ex.total_bars);
    println!("Buy Signals:    {}", ex.signals.buy);
    println!("Sell Signals:   {}", ex.signals.sell);
    println!("Total Signals:  {}", ex.signals.total);
}

fn print_strategy(run: &StrategyRun) {
    let raw = run.raw_signals();
    let fin = run.final_signals();
    let stats = &run.output.stats;
    println!();
    println!("=== Strategy Result ===");
    println!("Config:         {}", run.metadata.config_name);
    println!("Run ID:         {}", run.metadata.run_id);
    println!("Bars Processed: {}", run.data.rows);
    println!("Raw Signals:    {} ({} buy, {} sell)", raw.total, raw.buy, raw.sell);
    println!();
    println!("--- Final Signal Split ---");
    println!("BUY:            {} (rejected: {})", fin.buy, raw.buy - fin.buy);
    println!("SELL:           {} (rejected: {})", fin.sell, raw.sell - fin.sell);
    println!("Adjusted Stops: {}", stats.risk.adjusted.total());
    if !stats.rejection_reasons.is_empty() {
        println!();
        println!("--- Rejections ---");
        for (reason, n) in &stats.rejection_reasons {
            println!("{reason:<40} {n}");
        }
    }
}

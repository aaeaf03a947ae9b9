//! File-to-report runs through the public entry points.

use std::io::Write;
use std::path::Path;

use wbws_core::data::{generate_bars, SyntheticConfig};
use wbws_core::domain::Bar;
use wbws_runner::{run_strategy, run_trigger, LoadError, RunConfig, RunError};

fn write_csv(path: &Path, bars: &[Bar]) {
    let mut f = std::fs::File::create(path).unwrap();
    writeln!(f, "timestamp,open,high,low,close,volume").unwrap();
    for b in bars {
        writeln!(
            f,
            "{},{},{},{},{},{}",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        )
        .unwrap();
    }
}

fn setup(dir: &Path) -> RunConfig {
    let bars = generate_bars(&SyntheticConfig {
        days: 4,
        ..Default::default()
    });
    let csv_path = dir.join("bars.csv");
    write_csv(&csv_path, &bars);

    let toml = format!(
        r#"
        name = "integration"

        [asset]
        symbol = "SYN"

        [data]
        file = "{}"

        [output]
        outputs_dir = "{}"
        "#,
        csv_path.display(),
        dir.join("out").display()
    );
    let cfg_path = dir.join("run.toml");
    std::fs::write(&cfg_path, toml).unwrap();
    RunConfig::from_file(&cfg_path).unwrap()
}

#[test]
fn strategy_run_from_files() {
    let tmp = tempfile::tempdir().unwrap();
    let config = setup(tmp.path());
    let run = run_strategy(&config).unwrap();
    assert_eq!(run.data.rows, 4 * 780);
    assert_eq!(run.metadata.symbol, "SYN");
    assert!(run.final_signals().total <= run.raw_signals().total);
}

#[test]
fn date_window_limits_signal_bars() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = setup(tmp.path());
    // Synthetic data starts Tuesday 2024-01-02; the window keeps the last two days.
    config.data.date_range.start = chrono::NaiveDate::from_ymd_opt(2024, 1, 4);
    let trigger = run_trigger(&config).unwrap();
    assert_eq!(trigger.execution.total_bars, 2 * 780);
    assert_eq!(trigger.data.history_rows, 4 * 780);
    assert!(trigger
        .frame
        .rows
        .iter()
        .all(|r| r.timestamp.date() >= chrono::NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()));
}

#[test]
fn trigger_and_strategy_agree_on_raw_signals() {
    let tmp = tempfile::tempdir().unwrap();
    let config = setup(tmp.path());
    let trigger = run_trigger(&config).unwrap();
    let strategy = run_strategy(&config).unwrap();
    assert_eq!(trigger.execution.signals, strategy.raw_signals());
    assert_eq!(trigger.metadata.run_id, strategy.metadata.run_id);
}

#[test]
fn missing_data_file_is_a_data_error() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = setup(tmp.path());
    config.data.file = tmp.path().join("nope.csv");
    let err = run_trigger(&config).unwrap_err();
    assert!(matches!(err, RunError::Data(LoadError::Data(_))));
}

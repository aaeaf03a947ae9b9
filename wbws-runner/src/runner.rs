//! Run orchestration: load data, run the trigger or the full pipeline.
//!
//! Two entry points per run kind:
//! - `run_trigger()` / `run_strategy()`: load the configured data file, then run. Used by the CLI.
//! - `run_trigger_on()` / `run_strategy_on()`: take already loaded data. Used by tests and `synth`.

use std::time::Instant;

use thiserror::Error;

use wbws_core::components::SignalGenerator;
use wbws_core::config::ConfigError;
use wbws_core::pipeline::{Pipeline, PipelineError};

use crate::config::RunConfig;
use crate::data_loader::{load_data, LoadError, LoadedData};
use crate::result::{RunMetadata, StrategyRun, TriggerExecution, TriggerRun};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

pub fn run_trigger(config: &RunConfig) -> Result<TriggerRun, RunError> {
    config.validate()?;
    let loaded = load_data(&config.data)?;
    run_trigger_on(config, &loaded)
}

/// Classify, resolve the HTF bias and mark raw signals. No filters, no risk.
pub fn run_trigger_on(config: &RunConfig, loaded: &LoadedData) -> Result<TriggerRun, RunError> {
    let started = Instant::now();
    let trigger = config.strategy.trigger()?;
    let frame = trigger.generate(loaded.bars());
    let execution = TriggerExecution::from_frame(config, &frame);

    let run_id = config.run_id(&loaded.dataset_hash);
    let metadata = RunMetadata::new(config, &run_id, started.elapsed().as_secs_f64());
    tracing::info!(
        run_id = %metadata.run_id,
        bars = execution.total_bars,
        buy = execution.signals.buy,
        sell = execution.signals.sell,
        "trigger run complete"
    );

    Ok(TriggerRun {
        metadata,
        config: config.clone(),
        data: loaded.info.clone(),
        execution,
        frame,
    })
}

pub fn run_strategy(config: &RunConfig) -> Result<StrategyRun, RunError> {
    config.validate()?;
    let loaded = load_data(&config.data)?;
    run_strategy_on(config, &loaded)
}

/// Trigger, session filter, RSI filter and risk engine.
pub fn run_strategy_on(config: &RunConfig, loaded: &LoadedData) -> Result<StrategyRun, RunError> {
    let started = Instant::now();
    let pipeline = Pipeline::from_config(&config.strategy, loaded.risk_history())?;
    let output = pipeline.run(loaded.bars())?;

    let run_id = config.run_id(&loaded.dataset_hash);
    let metadata = RunMetadata::new(config, &run_id, started.elapsed().as_secs_f64());
    let run = StrategyRun {
        metadata,
        config: config.clone(),
        data: loaded.info.clone(),
        output,
    };

    let raw = run.raw_signals();
    let fin = run.final_signals();
    tracing::info!(
        run_id = %run.metadata.run_id,
        raw = raw.total,
        final_buy = fin.buy,
        final_sell = fin.sell,
        rejected_buy = raw.buy - fin.buy,
        rejected_sell = raw.sell - fin.sell,
        "strategy run complete"
    );
    Ok(run)
}

//! Results of trigger-only and full strategy runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wbws_core::candles::HtfAlignment;
use wbws_core::components::SignalFrame;
use wbws_core::domain::RunId;
use wbws_core::pipeline::PipelineOutput;

use crate::config::RunConfig;
use crate::data_loader::PreprocessingInfo;

/// Identity and timing shared by every run kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub config_id: String,
    pub dataset_hash: String,
    pub config_name: String,
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub duration_secs: f64,
}

impl RunMetadata {
    pub fn new(config: &RunConfig, run_id: &RunId, duration_secs: f64) -> Self {
        Self {
            run_id: run_id.short(),
            config_id: run_id.config_id.to_string(),
            dataset_hash: run_id.dataset_hash.to_string(),
            config_name: config.name.clone(),
            symbol: config.symbol().to_string(),
            generated_at: Utc::now(),
            duration_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub buy: usize,
    pub sell: usize,
    pub total: usize,
}

impl SignalCounts {
    pub fn new(buy: usize, sell: usize) -> Self {
        Self {
            buy,
            sell,
            total: buy + sell,
        }
    }
}

/// Trigger execution summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerExecution {
    pub htf_period: String,
    pub htf_alignment: HtfAlignment,
    pub total_bars: usize,
    pub htf_buckets: usize,
    pub signals: SignalCounts,
}

impl TriggerExecution {
    pub fn from_frame(config: &RunConfig, frame: &SignalFrame) -> Self {
        Self {
            htf_period: config.strategy.indicator.htf_period.clone(),
            htf_alignment: config.strategy.indicator.htf_alignment,
            total_bars: frame.len(),
            htf_buckets: frame.htf_buckets,
            signals: SignalCounts::new(frame.buy_count(), frame.sell_count()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TriggerRun {
    pub metadata: RunMetadata,
    pub config: RunConfig,
    pub data: PreprocessingInfo,
    pub execution: TriggerExecution,
    pub frame: SignalFrame,
}

#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub metadata: RunMetadata,
    pub config: RunConfig,
    pub data: PreprocessingInfo,
    pub output: PipelineOutput,
}

impl StrategyRun {
    pub fn raw_signals(&self) -> SignalCounts {
        let raw = self.output.stats.raw_signals();
        SignalCounts::new(raw.buy, raw.sell)
    }

    pub fn final_signals(&self) -> SignalCounts {
        let fin = self.output.stats.final_signals();
        SignalCounts::new(fin.buy, fin.sell)
    }
}

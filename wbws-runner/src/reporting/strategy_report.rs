//! Strategy report: raw vs final signal split, per-stage counts, trades.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use wbws_core::components::SignalDirection;
use wbws_core::pipeline::{ExecutionStats, TradeRecord};

use super::common::{ReportConfiguration, ReportMetadata, SAMPLE_SIZE, STRATEGY_REPORT_TYPE};
use crate::data_loader::PreprocessingInfo;
use crate::result::StrategyRun;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyCounts {
    pub raw_buy: usize,
    pub raw_sell: usize,
    pub final_buy: usize,
    pub final_sell: usize,
    pub adjusted: usize,
}

impl StrategyCounts {
    pub fn rejected_buy(&self) -> usize {
        self.raw_buy - self.final_buy
    }

    pub fn rejected_sell(&self) -> usize {
        self.raw_sell - self.final_sell
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleTimestamps {
    pub buy_timestamps: Vec<NaiveDateTime>,
    pub sell_timestamps: Vec<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyReport {
    pub report_metadata: ReportMetadata,
    pub configuration: ReportConfiguration,
    pub data_preprocessing: PreprocessingInfo,
    pub counts: StrategyCounts,
    pub stages: ExecutionStats,
    pub samples: SampleTimestamps,
    pub trades: Vec<TradeRecord>,
}

impl StrategyReport {
    pub fn from_run(run: &StrategyRun) -> Self {
        let stats = &run.output.stats;
        let raw = stats.raw_signals();
        let fin = stats.final_signals();

        let first = |direction: SignalDirection| {
            run.output
                .trades
                .iter()
                .filter(|t| t.direction == direction)
                .take(SAMPLE_SIZE)
                .map(|t| t.timestamp)
                .collect::<Vec<_>>()
        };

        Self {
            report_metadata: ReportMetadata::new(STRATEGY_REPORT_TYPE, &run.metadata),
            configuration: ReportConfiguration::from_config(&run.config),
            data_preprocessing: run.data.clone(),
            counts: StrategyCounts {
                raw_buy: raw.buy,
                raw_sell: raw.sell,
                final_buy: fin.buy,
                final_sell: fin.sell,
                adjusted: stats.risk.adjusted.total(),
            },
            stages: stats.clone(),
            samples: SampleTimestamps {
                buy_timestamps: first(SignalDirection::Buy),
                sell_timestamps: first(SignalDirection::Sell),
            },
            trades: run.output.trades.clone(),
        }
    }

    /// Rejections grouped by stage label, summed over reasons.
    pub fn rejections_by_stage(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for (reason, n) in &self.stages.rejection_reasons {
            let stage = reason.split(':').next().unwrap_or(reason).trim().to_string();
            *out.entry(stage).or_insert(0) += n;
        }
        out
    }
}

//! Trigger execution report: what the scan saw and what it fired.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use wbws_core::candles::{CandleType, HtfState};
use wbws_core::components::{SignalFrame, SignalRow};

use super::common::{
    percent, CountPct, ReportConfiguration, ReportMetadata, SAMPLE_SIZE, TRIGGER_REPORT_TYPE,
};
use crate::data_loader::PreprocessingInfo;
use crate::result::{TriggerExecution, TriggerRun};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAnalysis {
    pub total_bars: usize,
    pub buy_signals: CountPct,
    pub sell_signals: CountPct,
    pub total_signals: CountPct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSignal {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub candle_type: Option<i8>,
}

impl From<&SignalRow> for SampleSignal {
    fn from(row: &SignalRow) -> Self {
        Self {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            candle_type: row.candle_type.code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSignals {
    pub buy_samples: Vec<SampleSignal>,
    pub sell_samples: Vec<SampleSignal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleDistribution {
    pub total_bars: usize,
    pub classified_bars: usize,
    pub unclassified_bars: usize,
    pub classification_rate: f64,
    /// Only types that occur. Percentages are of classified bars.
    pub distribution: BTreeMap<String, CountPct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtfAnalysis {
    pub htf_bull_bars: CountPct,
    pub htf_bear_bars: CountPct,
    pub htf_neutral_bars: CountPct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReversalStat {
    pub count: usize,
    pub converted: usize,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReversalPatterns {
    pub reversals_2d_to_2u: ReversalStat,
    pub reversals_2u_to_2d: ReversalStat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerReport {
    pub report_metadata: ReportMetadata,
    pub configuration: ReportConfiguration,
    pub data_preprocessing: PreprocessingInfo,
    pub execution: TriggerExecution,
    pub signal_analysis: SignalAnalysis,
    pub sample_signals: SampleSignals,
    pub candle_distribution: CandleDistribution,
    pub htf_analysis: HtfAnalysis,
    pub reversal_patterns: ReversalPatterns,
}

impl TriggerReport {
    pub fn from_run(run: &TriggerRun) -> Self {
        let frame = &run.frame;
        Self {
            report_metadata: ReportMetadata::new(TRIGGER_REPORT_TYPE, &run.metadata),
            configuration: ReportConfiguration::from_config(&run.config),
            data_preprocessing: run.data.clone(),
            execution: run.execution.clone(),
            signal_analysis: signal_analysis(frame),
            sample_signals: sample_signals(frame),
            candle_distribution: candle_distribution(frame),
            htf_analysis: htf_analysis(frame),
            reversal_patterns: reversal_patterns(frame),
        }
    }
}

fn signal_analysis(frame: &SignalFrame) -> SignalAnalysis {
    let total = frame.len();
    let buy = frame.buy_count();
    let sell = frame.sell_count();
    SignalAnalysis {
        total_bars: total,
        buy_signals: CountPct::of(buy, total),
        sell_signals: CountPct::of(sell, total),
        total_signals: CountPct::of(buy + sell, total),
    }
}

fn sample_signals(frame: &SignalFrame) -> SampleSignals {
    let take = |pred: fn(&SignalRow) -> bool| -> Vec<SampleSignal> {
        frame
            .rows
            .iter()
            .filter(|r| pred(r))
            .take(SAMPLE_SIZE)
            .map(SampleSignal::from)
            .collect()
    };
    SampleSignals {
        buy_samples: take(|r| r.we_buy),
        sell_samples: take(|r| r.we_sell),
    }
}

fn candle_key(candle: CandleType) -> Option<&'static str> {
    match candle {
        CandleType::Inside => Some("inside_bars"),
        CandleType::DirectionalUp => Some("directional_up"),
        CandleType::DirectionalDown => Some("directional_down"),
        CandleType::Outside => Some("outside_bars"),
        CandleType::Unclassified => None,
    }
}

fn candle_distribution(frame: &SignalFrame) -> CandleDistribution {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for row in &frame.rows {
        if let Some(key) = candle_key(row.candle_type) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    let classified: usize = counts.values().sum();
    let total = frame.len();

    CandleDistribution {
        total_bars: total,
        classified_bars: classified,
        unclassified_bars: total - classified,
        classification_rate: percent(classified, total),
        distribution: counts
            .into_iter()
            .map(|(k, n)| (k.to_string(), CountPct::of(n, classified)))
            .collect(),
    }
}

fn htf_analysis(frame: &SignalFrame) -> HtfAnalysis {
    let dist = frame.htf_distribution();
    let total = frame.len();
    let count = |state: HtfState| dist.get(&state).copied().unwrap_or(0);
    HtfAnalysis {
        htf_bull_bars: CountPct::of(count(HtfState::Bullish), total),
        htf_bear_bars: CountPct::of(count(HtfState::Bearish), total),
        htf_neutral_bars: CountPct::of(count(HtfState::Neutral), total),
    }
}

fn reversal_patterns(frame: &SignalFrame) -> ReversalPatterns {
    let stat = |count: usize, converted: usize| ReversalStat {
        count,
        converted,
        conversion_rate: percent(converted, count),
    };
    ReversalPatterns {
        reversals_2d_to_2u: stat(frame.rev_2d_2u_count(), frame.buy_count()),
        reversals_2u_to_2d: stat(frame.rev_2u_2d_count(), frame.sell_count()),
    }
}

//! Stage sequencing: Trigger → Time → Momentum → Risk.
//!
//! The trigger scans the bars once. Each raw signal then runs the filter chain
//! independently; signals are evaluated in parallel and collected back in
//! trigger order.

use crate::components::filter::SignalFilter;
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::components::signal::{FilterVerdict, SignalEvaluation, SignalEvent, SignalGenerator};
use crate::components::trigger::SignalFrame;
use crate::config::{ConfigError, StrategyConfig};
use crate::data::schema::{validate_bars, SchemaError};
use crate::domain::Bar;
use crate::risk::{RiskDecision, RiskEngine, RiskGate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::disposition::{Disposition, Stage, StageStep};
use super::stats::ExecutionStats;
use super::TradeRecord;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Final state of one raw signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalOutcome {
    pub event: SignalEvent,
    pub evaluations: Vec<SignalEvaluation>,
    pub risk: Option<RiskDecision>,
    pub disposition: Disposition,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub frame: SignalFrame,
    pub outcomes: Vec<SignalOutcome>,
    pub stats: ExecutionStats,
    pub trades: Vec<TradeRecord>,
}

pub struct Pipeline {
    trigger: Box<dyn SignalGenerator>,
    time_filter: Box<dyn SignalFilter>,
    momentum_filter: Box<dyn SignalFilter>,
    risk: Box<dyn RiskGate>,
}

impl Pipeline {
    pub fn new(
        trigger: Box<dyn SignalGenerator>,
        time_filter: Box<dyn SignalFilter>,
        momentum_filter: Box<dyn SignalFilter>,
        risk: Box<dyn RiskGate>,
    ) -> Self {
        Self {
            trigger,
            time_filter,
            momentum_filter,
            risk,
        }
    }

    /// Wire the WBWS stages from configuration. The risk engine derives its
    /// ATR and annual range from `history`, which may start before the bars
    /// later passed to [`Pipeline::run`].
    pub fn from_config(config: &StrategyConfig, history: &[Bar]) -> Result<Self, PipelineError> {
        config.validate()?;
        validate_bars(history)?;
        Ok(Self::new(
            Box::new(config.trigger()?),
            Box::new(config.session_filter()?),
            Box::new(config.rsi_filter()),
            Box::new(RiskEngine::new(history, &config.risk)),
        ))
    }

    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        let mut indicators = self.time_filter.required_indicators();
        indicators.extend(self.momentum_filter.required_indicators());
        indicators
    }

    pub fn run(&self, bars: &[Bar]) -> Result<PipelineOutput, PipelineError> {
        validate_bars(bars)?;

        let frame = self.trigger.generate(bars);
        let indicators = IndicatorValues::precompute(bars, &self.required_indicators());

        // Indexed parallel collect keeps trigger order.
        let outcomes: Vec<SignalOutcome> = frame
            .events
            .par_iter()
            .map(|event| self.evaluate(event, bars, &indicators))
            .collect();

        let mut stats = ExecutionStats::default();
        for outcome in &outcomes {
            stats.record(outcome.event.direction, &outcome.disposition);
        }

        let trades: Vec<TradeRecord> = outcomes.iter().filter_map(TradeRecord::from_outcome).collect();

        let raw = stats.raw_signals();
        let time_removed = stats.time.rejected.total();
        if time_removed > 0 {
            tracing::info!(
                removed = time_removed,
                total = raw.total(),
                "time filter removed {:.1}% of signals",
                time_removed as f64 / raw.total() as f64 * 100.0
            );
        }
        tracing::info!(
            bars = bars.len(),
            raw_buy = raw.buy,
            raw_sell = raw.sell,
            final_buy = stats.final_signals().buy,
            final_sell = stats.final_signals().sell,
            adjusted = stats.risk.adjusted.total(),
            "pipeline complete"
        );

        Ok(PipelineOutput {
            frame,
            outcomes,
            stats,
            trades,
        })
    }

    fn evaluate(&self, event: &SignalEvent, bars: &[Bar], indicators: &IndicatorValues) -> SignalOutcome {
        let mut evaluations = Vec::with_capacity(2);
        let mut risk = None;

        let disposition = Disposition::Raw
            .advance(Stage::Time, || {
                filter_step(self.time_filter.as_ref(), event, bars, indicators, &mut evaluations)
            })
            .advance(Stage::Momentum, || {
                filter_step(self.momentum_filter.as_ref(), event, bars, indicators, &mut evaluations)
            })
            .advance(Stage::Risk, || {
                let decision = self.risk.assess(event);
                let step = match &decision {
                    RiskDecision::Approved { profile, comment } => StageStep::Approve {
                        profile: *profile,
                        adjusted: false,
                        comment: comment.clone(),
                    },
                    RiskDecision::Adjusted {
                        profile, comment, ..
                    } => StageStep::Approve {
                        profile: *profile,
                        adjusted: true,
                        comment: comment.clone(),
                    },
                    RiskDecision::Rejected { comment, .. } => StageStep::Reject(comment.clone()),
                };
                risk = Some(decision);
                step
            });

        tracing::debug!(
            signal = %event.id,
            timestamp = %event.timestamp,
            direction = %event.direction,
            approved = disposition.is_approved(),
            "signal evaluated"
        );

        SignalOutcome {
            event: event.clone(),
            evaluations,
            risk,
            disposition,
        }
    }
}

fn filter_step(
    filter: &dyn SignalFilter,
    event: &SignalEvent,
    bars: &[Bar],
    indicators: &IndicatorValues,
    evaluations: &mut Vec<SignalEvaluation>,
) -> StageStep {
    let evaluation = filter.evaluate(event, bars, event.bar_index, indicators);
    let step = match &evaluation.verdict {
        FilterVerdict::Passed => StageStep::Pass,
        FilterVerdict::FilteredBySession => StageStep::Reject("outside session".into()),
        FilterVerdict::FilteredByMomentum => StageStep::Reject(momentum_reason(&evaluation)),
        FilterVerdict::FilteredByCustom(reason) => StageStep::Reject(reason.clone()),
    };
    evaluations.push(evaluation);
    step
}

fn momentum_reason(evaluation: &SignalEvaluation) -> String {
    match evaluation.filter_state.get("rsi") {
        Some(rsi) => format!("rsi: {rsi:.2}"),
        None => "rsi unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candles::{HtfAlignment, HtfPeriod};
    use crate::components::filter::{RsiFilter, SessionFilter, SessionTime};
    use crate::components::trigger::WbwsTrigger;
    use crate::config::RiskConfig;
    use crate::indicators::make_ohlc_bars;
    use chrono::{Duration, NaiveDate};

    fn minute_bars(start_hour: u32, data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(start_hour, 0, 0)
            .unwrap();
        let mut bars = make_ohlc_bars(data);
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.timestamp = start + Duration::minutes(i as i64);
        }
        bars
    }

    /// 2d→2u reversal inside a bullish hour, preceded by enough bars for ATR(3).
    fn buy_setup(start_hour: u32) -> Vec<Bar> {
        minute_bars(
            start_hour,
            &[
                (100.0, 101.0, 99.0, 100.5),
                (100.5, 101.5, 99.5, 101.0),
                (101.0, 102.0, 100.0, 101.5),
                (101.5, 102.5, 100.5, 102.0),
                (102.0, 102.2, 99.8, 100.0), // 2d
                (100.0, 104.0, 99.9, 103.5), // 2u → Buy
            ],
        )
    }

    fn pipeline(session: (u32, u32), rsi_enabled: bool, bars: &[Bar]) -> Pipeline {
        let mut risk = RiskConfig::default();
        risk.sl_tp.atr_length = 3;
        Pipeline::new(
            Box::new(WbwsTrigger::new(
                HtfPeriod::from_minutes(60).unwrap(),
                HtfAlignment::BucketStart,
            )),
            Box::new(
                SessionFilter::new(
                    SessionTime::new(session.0, 0).unwrap(),
                    SessionTime::new(session.1, 0).unwrap(),
                    true,
                )
                .unwrap(),
            ),
            Box::new(RsiFilter::new(3, 101.0, -1.0, rsi_enabled)),
            Box::new(RiskEngine::new(bars, &risk)),
        )
    }

    #[test]
    fn approved_signal_becomes_trade() {
        let bars = buy_setup(9);
        let out = pipeline((8, 20), true, &bars).run(&bars).unwrap();
        assert_eq!(out.frame.buy_count(), 1);
        assert_eq!(out.outcomes.len(), 1);
        assert!(out.outcomes[0].disposition.is_approved());
        assert_eq!(out.trades.len(), 1);

        let trade = &out.trades[0];
        assert_eq!(trade.entry_price, 103.5);
        assert!(trade.stop_loss < trade.entry_price);
        assert!(trade.take_profit > trade.entry_price);
        assert_eq!(trade.comment, "Risk management disabled");
        assert_eq!(out.stats.final_signals().buy, 1);
        assert_eq!(out.outcomes[0].evaluations.len(), 2);
    }

    #[test]
    fn signal_on_first_rsi_bar_is_sized() {
        // Buy on bar 2: the first bar with RSI(3), and ATR(3) has no floor.
        let bars = minute_bars(
            9,
            &[
                (100.0, 101.0, 99.0, 100.5),
                (100.5, 100.8, 98.5, 99.0),  // 2d
                (99.0, 102.0, 98.8, 101.5),  // 2u → Buy
            ],
        );
        let out = pipeline((8, 20), true, &bars).run(&bars).unwrap();
        assert_eq!(out.outcomes.len(), 1);
        assert_eq!(out.outcomes[0].event.bar_index, 2);
        assert!(out.outcomes[0].disposition.is_approved());
        assert_eq!(out.outcomes[0].evaluations[1].filter_state.len(), 3);
        assert_eq!(out.trades.len(), 1);
    }

    #[test]
    fn out_of_session_stops_at_time_stage() {
        let bars = buy_setup(6);
        let out = pipeline((8, 20), true, &bars).run(&bars).unwrap();
        assert_eq!(out.outcomes[0].disposition.rejected_at(), Some(Stage::Time));
        assert!(out.outcomes[0].risk.is_none());
        assert_eq!(out.outcomes[0].evaluations.len(), 1);
        assert_eq!(out.stats.time.rejected.buy, 1);
        assert_eq!(out.stats.momentum.input.total(), 0);
        assert!(out.trades.is_empty());
    }

    #[test]
    fn unsorted_bars_fail_before_signals() {
        let mut bars = buy_setup(9);
        bars.swap(1, 2);
        let err = pipeline((8, 20), true, &bars).run(&bars).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn from_config_rejects_invalid_config() {
        let mut config = StrategyConfig::default();
        config.time_filter.session_start = SessionTime { hour: 21, minute: 0 };
        assert!(matches!(
            Pipeline::from_config(&config, &[]),
            Err(PipelineError::Config(ConfigError::InvalidSession(_)))
        ));
    }
}

//! WBWS trigger: 2d→2u reversal under bullish HTF bias is a Buy, 2u→2d
//! reversal under bearish HTF bias is a Sell.

use crate::candles::{classify_series, CandleType, HtfAlignment, HtfPeriod, HtfResolver, HtfState};
use crate::domain::{Bar, SignalEventId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::signal::{SignalDirection, SignalEvent, SignalGenerator};

/// One row of the per-bar signal table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub candle_type: CandleType,
    /// 2d followed by 2u.
    pub rev_2d_2u: bool,
    /// 2u followed by 2d.
    pub rev_2u_2d: bool,
    pub htf_state: HtfState,
    pub we_buy: bool,
    pub we_sell: bool,
}

impl SignalRow {
    pub fn htf_bull(&self) -> bool {
        self.htf_state.is_bull()
    }

    pub fn htf_bear(&self) -> bool {
        self.htf_state.is_bear()
    }

    pub fn direction(&self) -> Option<SignalDirection> {
        match (self.we_buy, self.we_sell) {
            (true, false) => Some(SignalDirection::Buy),
            (false, true) => Some(SignalDirection::Sell),
            _ => None,
        }
    }
}

/// Trigger output: the per-bar table plus the raw events it fired.
#[derive(Debug, Clone, Default)]
pub struct SignalFrame {
    pub rows: Vec<SignalRow>,
    pub events: Vec<SignalEvent>,
    /// Number of non-empty HTF buckets behind the bias column.
    pub htf_buckets: usize,
}

impl SignalFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn buy_count(&self) -> usize {
        self.rows.iter().filter(|r| r.we_buy).count()
    }

    pub fn sell_count(&self) -> usize {
        self.rows.iter().filter(|r| r.we_sell).count()
    }

    pub fn rev_2d_2u_count(&self) -> usize {
        self.rows.iter().filter(|r| r.rev_2d_2u).count()
    }

    pub fn rev_2u_2d_count(&self) -> usize {
        self.rows.iter().filter(|r| r.rev_2u_2d).count()
    }

    /// Count of bars per candle type, keyed by label ("1", "2u", "2d", "3", "-").
    pub fn candle_distribution(&self) -> BTreeMap<&'static str, usize> {
        let mut dist = BTreeMap::new();
        for row in &self.rows {
            *dist.entry(row.candle_type.label()).or_insert(0) += 1;
        }
        dist
    }

    /// Count of bars per HTF state.
    pub fn htf_distribution(&self) -> BTreeMap<HtfState, usize> {
        let mut dist = BTreeMap::new();
        for row in &self.rows {
            *dist.entry(row.htf_state).or_insert(0) += 1;
        }
        dist
    }
}

/// The WBWS reversal trigger.
#[derive(Debug, Clone)]
pub struct WbwsTrigger {
    resolver: HtfResolver,
}

impl WbwsTrigger {
    pub fn new(period: HtfPeriod, alignment: HtfAlignment) -> Self {
        Self {
            resolver: HtfResolver::new(period, alignment),
        }
    }

    pub fn htf_period(&self) -> HtfPeriod {
        self.resolver.period()
    }

    pub fn alignment(&self) -> HtfAlignment {
        self.resolver.alignment()
    }
}

impl SignalGenerator for WbwsTrigger {
    fn name(&self) -> &str {
        "wbws_trigger"
    }

    fn generate(&self, bars: &[Bar]) -> SignalFrame {
        let candles = classify_series(bars);
        let htf = self.resolver.resolve(bars);

        let mut rows = Vec::with_capacity(bars.len());
        let mut events = Vec::new();
        let mut next_id = 0u64;

        for (i, bar) in bars.iter().enumerate() {
            let candle_type = candles[i];
            let prev = if i > 0 {
                candles[i - 1]
            } else {
                CandleType::Unclassified
            };
            let htf_state = htf.per_bar.get(i).copied().unwrap_or(HtfState::Neutral);

            let rev_2d_2u =
                prev == CandleType::DirectionalDown && candle_type == CandleType::DirectionalUp;
            let rev_2u_2d =
                prev == CandleType::DirectionalUp && candle_type == CandleType::DirectionalDown;
            let we_buy = rev_2d_2u && htf_state.is_bull();
            let we_sell = rev_2u_2d && htf_state.is_bear();

            let row = SignalRow {
                timestamp: bar.timestamp,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                candle_type,
                rev_2d_2u,
                rev_2u_2d,
                htf_state,
                we_buy,
                we_sell,
            };

            if let Some(direction) = row.direction() {
                if let Some(event) = SignalEvent::at_bar(SignalEventId(next_id), bars, i, direction) {
                    events.push(event);
                    next_id += 1;
                }
            }
            rows.push(row);
        }

        tracing::debug!(
            bars = bars.len(),
            htf_buckets = htf.buckets.len(),
            signals = events.len(),
            "trigger scan complete"
        );

        SignalFrame {
            rows,
            events,
            htf_buckets: htf.buckets.len(),
        }
    }
}

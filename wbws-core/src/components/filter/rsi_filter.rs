//! RSI momentum filter.
//!
//! Buy passes while RSI < overbought; Sell passes while RSI > oversold.
//!
//! RSI is defined from bar `length - 1`. Before that the value is missing and
//! both directions are rejected. Substituting 100 for the missing value would
//! block every buy and pass every sell, so warm-up bars would act as an
//! overbought market. Rejecting treats the two sides the same.

use crate::components::indicator::{Indicator, IndicatorValues};
use crate::components::signal::{FilterVerdict, SignalDirection, SignalEvaluation, SignalEvent};
use crate::domain::Bar;
use crate::indicators::Rsi;
use std::collections::HashMap;

use super::SignalFilter;

#[derive(Debug, Clone)]
pub struct RsiFilter {
    pub length: usize,
    pub overbought: f64,
    pub oversold: f64,
    pub enabled: bool,
    indicator_key: String,
}

impl RsiFilter {
    pub fn new(length: usize, overbought: f64, oversold: f64, enabled: bool) -> Self {
        let rsi = Rsi::new(length);
        Self {
            length: rsi.period(),
            overbought,
            oversold,
            enabled,
            indicator_key: rsi.name().to_string(),
        }
    }

    pub fn default_params() -> Self {
        Self::new(14, 70.0, 30.0, true)
    }

    pub fn indicator_key(&self) -> &str {
        &self.indicator_key
    }

    /// Pure threshold check, independent of the indicator container.
    pub fn allows(&self, direction: SignalDirection, rsi: Option<f64>) -> bool {
        if !self.enabled {
            return true;
        }
        match (direction, rsi.filter(|v| !v.is_nan())) {
            (SignalDirection::Buy, Some(v)) => v < self.overbought,
            (SignalDirection::Sell, Some(v)) => v > self.oversold,
            (_, None) => false,
        }
    }
}

impl SignalFilter for RsiFilter {
    fn name(&self) -> &str {
        "rsi_filter"
    }

    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        if self.enabled {
            vec![Box::new(Rsi::new(self.length))]
        } else {
            Vec::new()
        }
    }

    fn evaluate(
        &self,
        signal: &SignalEvent,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> SignalEvaluation {
        let rsi = indicators.get_valid(&self.indicator_key, bar_index);

        let mut filter_state = HashMap::new();
        if let Some(v) = rsi {
            filter_state.insert("rsi".into(), v);
            filter_state.insert("overbought".into(), self.overbought);
            filter_state.insert("oversold".into(), self.oversold);
        }

        let verdict = if self.allows(signal.direction, rsi) {
            FilterVerdict::Passed
        } else {
            FilterVerdict::FilteredByMomentum
        };

        SignalEvaluation {
            signal_event_id: signal.id,
            filter_name: self.name().to_string(),
            verdict,
            filter_state,
        }
    }
}

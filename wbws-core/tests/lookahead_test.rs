//! Look-ahead contamination tests.
//!
//! No value at bar t may depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series and on the full series, then assert the
//! overlapping prefix is identical. Any difference means future data leaked
//! into past values.

use wbws_core::candles::{HtfAlignment, HtfPeriod, HtfResolver};
use wbws_core::components::indicator::Indicator;
use wbws_core::components::signal::SignalGenerator;
use wbws_core::components::trigger::WbwsTrigger;
use wbws_core::data::{generate_bars, SyntheticConfig};
use wbws_core::domain::Bar;
use wbws_core::indicators::{AnnualRange, Atr, Rsi};
use wbws_core::risk::RiskEngine;
use wbws_core::config::RiskConfig;

fn make_test_bars(days: usize, bars_per_day: usize) -> Vec<Bar> {
    generate_bars(&SyntheticConfig {
        seed: 11,
        days,
        bars_per_day,
        volatility: 0.002,
        ..Default::default()
    })
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let truncated = &full_bars[..truncated_len];
    let full_result = indicator.compute(full_bars);
    let truncated_result = indicator.compute(truncated);

    assert_eq!(truncated_result.len(), truncated_len);
    assert_eq!(full_result.len(), full_bars.len());

    for i in 0..truncated_len {
        let t = truncated_result[i];
        let f = full_result[i];

        if t.is_nan() && f.is_nan() {
            continue;
        }

        assert!(
            !t.is_nan() && !f.is_nan(),
            "{}: NaN mismatch at bar {i} (truncated={t}, full={f})",
            indicator.name()
        );
        assert!(
            (t - f).abs() < 1e-10,
            "{}: look-ahead contamination at bar {i}: truncated={t}, full={f}",
            indicator.name()
        );
    }
}

#[test]
fn rsi_no_lookahead() {
    let bars = make_test_bars(3, 120);
    for cut in [20, 97, 200] {
        assert_no_lookahead(&Rsi::new(14), &bars, cut);
    }
}

#[test]
fn atr_no_lookahead() {
    let bars = make_test_bars(3, 120);
    for cut in [20, 97, 200] {
        assert_no_lookahead(&Atr::new(14), &bars, cut);
    }
}

#[test]
fn annual_range_no_lookahead_mid_day() {
    // 40 days of 30 bars; cut in the middle of day 30 so the current day is partial.
    let bars = make_test_bars(40, 30);
    let cut = 30 * 30 + 13;
    let range = AnnualRange::default();
    assert_no_lookahead(&range, &bars, cut);

    // Values exist once 20 prior days are available.
    let values = range.compute(&bars[..cut]);
    assert!(values[..20 * 30].iter().all(|v| v.is_nan()));
    assert!(!values[cut - 1].is_nan());
}

#[test]
fn annual_range_ignores_spike_on_current_day() {
    let mut bars = make_test_bars(30, 10);
    let baseline = AnnualRange::default().compute(&bars);

    // Spike on day 25: the range for day 25 itself and earlier must not move.
    let spike_idx = 25 * 10 + 4;
    bars[spike_idx].high *= 3.0;
    let spiked = AnnualRange::default().compute(&bars);

    for i in 0..(26 * 10) {
        let (a, b) = (baseline[i], spiked[i]);
        assert!(
            (a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-10,
            "range moved at bar {i} before the spike day ended"
        );
    }
    // The following day sees it.
    assert!(spiked[26 * 10] > baseline[26 * 10]);
}

#[test]
fn htf_bucket_close_no_lookahead() {
    let bars = make_test_bars(2, 300);
    let resolver = HtfResolver::new(HtfPeriod::parse("60min").unwrap(), HtfAlignment::BucketClose);
    let full = resolver.resolve(&bars);
    for cut in [1, 59, 60, 61, 137, 450] {
        let truncated = resolver.resolve(&bars[..cut]);
        assert_eq!(&full.per_bar[..cut], &truncated.per_bar[..], "cut {cut}");
    }
}

#[test]
fn htf_bucket_start_stable_at_bucket_boundaries() {
    // Bucket-start alignment reads the bucket's final close, so it is only
    // prefix-stable when the cut lands on a bucket boundary.
    let bars = make_test_bars(1, 240);
    let resolver = HtfResolver::new(HtfPeriod::parse("60min").unwrap(), HtfAlignment::BucketStart);
    let full = resolver.resolve(&bars);
    for cut in [60, 120, 180] {
        let truncated = resolver.resolve(&bars[..cut]);
        assert_eq!(&full.per_bar[..cut], &truncated.per_bar[..], "cut {cut}");
    }
}

#[test]
fn trigger_rows_no_lookahead_with_bucket_close() {
    let bars = make_test_bars(2, 400);
    let trigger = WbwsTrigger::new(HtfPeriod::parse("30min").unwrap(), HtfAlignment::BucketClose);
    let full = trigger.generate(&bars);
    for cut in [45, 333, 701] {
        let truncated = trigger.generate(&bars[..cut]);
        assert_eq!(&full.rows[..cut], &truncated.rows[..], "cut {cut}");
    }
}

#[test]
fn risk_lookups_use_only_past_history() {
    let bars = make_test_bars(30, 20);
    let mut config = RiskConfig::default();
    config.risk_management.enabled = true;

    let cut = 25 * 20 + 7;
    let full = RiskEngine::new(&bars, &config);
    let truncated = RiskEngine::new(&bars[..cut], &config);

    for bar in &bars[..cut] {
        assert_eq!(full.atr_at(bar.timestamp), truncated.atr_at(bar.timestamp));
        assert_eq!(
            full.annual_range_at(bar.timestamp),
            truncated.annual_range_at(bar.timestamp)
        );
    }
}

//! Worked scenarios for the session window, RSI veto and risk sizing.

use chrono::{NaiveDate, NaiveDateTime};
use wbws_core::components::filter::{RsiFilter, SessionFilter, SessionTime, SignalFilter};
use wbws_core::components::indicator::IndicatorValues;
use wbws_core::components::signal::{FilterVerdict, SignalDirection, SignalEvent};
use wbws_core::config::{RiskConfig, RiskManagementConfig, SlTpConfig};
use wbws_core::domain::{Bar, SignalEventId};
use wbws_core::risk::{RiskDecision, RiskEngine, RiskGate};

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn bar(timestamp: NaiveDateTime, close: f64) -> Bar {
    Bar {
        timestamp,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1.0,
    }
}

fn signal_at(timestamp: NaiveDateTime, close: f64, direction: SignalDirection) -> SignalEvent {
    SignalEvent::at_bar(SignalEventId(0), &[bar(timestamp, close)], 0, direction).unwrap()
}

#[test]
fn scenario_a_session_boundaries() {
    let filter = SessionFilter::new(
        SessionTime::new(8, 30).unwrap(),
        SessionTime::new(20, 30).unwrap(),
        true,
    )
    .unwrap();

    let expectations = [
        ((8, 29), false),
        ((8, 30), true),
        ((20, 29), true),
        ((20, 30), false),
    ];
    for ((h, m), expected) in expectations {
        let signal = signal_at(at(h, m), 100.0, SignalDirection::Buy);
        let eval = filter.evaluate(&signal, &[], 0, &IndicatorValues::new());
        assert_eq!(eval.verdict.is_passed(), expected, "{h:02}:{m:02}");
        if !expected {
            assert_eq!(eval.verdict, FilterVerdict::FilteredBySession);
        }
    }
}

#[test]
fn scenario_b_rising_closes_block_buy() {
    let bars: Vec<Bar> = (0..20)
        .map(|i| bar(at(9, i), 18_000.0 + i as f64 * 3.0))
        .collect();
    let filter = RsiFilter::new(14, 70.0, 30.0, true);
    let iv = IndicatorValues::precompute(&bars, &filter.required_indicators());

    let rsi = iv.get_valid(filter.indicator_key(), 19).unwrap();
    assert!(rsi > 70.0, "RSI {rsi}");

    let buy = SignalEvent::at_bar(SignalEventId(1), &bars, 19, SignalDirection::Buy).unwrap();
    let eval = filter.evaluate(&buy, &bars, 19, &iv);
    assert_eq!(eval.verdict, FilterVerdict::FilteredByMomentum);

    // The same bar does not block a sell.
    let sell = SignalEvent::at_bar(SignalEventId(2), &bars, 19, SignalDirection::Sell).unwrap();
    assert!(filter.evaluate(&sell, &bars, 19, &iv).verdict.is_passed());
}

fn engine(atr: f64, range: Option<f64>, management: RiskManagementConfig) -> RiskEngine {
    let config = RiskConfig {
        sl_tp: SlTpConfig {
            enabled: true,
            atr_length: 14,
            sl_multiplier: 1.4,
            risk_to_reward_ratio: 2.0,
        },
        risk_management: management,
    };
    RiskEngine::from_series(vec![at(9, 0)], vec![atr], range.map(|r| vec![r]), &config)
}

#[test]
fn scenario_c_atr_stop_and_target() {
    let engine = engine(45.0, None, RiskManagementConfig::default());
    let profile = engine.compute_stop_target(18250.0, true, at(10, 0)).unwrap();
    assert!((profile.stop_loss - 18187.0).abs() < 1e-9);
    assert!((profile.take_profit - 18376.0).abs() < 1e-9);
    assert!((profile.stop_distance - 63.0).abs() < 1e-9);
    assert!((profile.target_distance - 126.0).abs() < 1e-9);
}

#[test]
fn scenario_d_stop_capped_at_two_percent_of_range() {
    let management = RiskManagementConfig {
        enabled: true,
        max_risk_percentile: 0.02,
        allow_exceed_limit: true,
    };
    let engine = engine(45.0, Some(2000.0), management);

    let validation = engine.validate_risk(18250.0, 17250.0, true, at(10, 0));
    assert!(validation.can_trade);
    assert!(validation.adjusted);
    assert!((validation.stop_loss.unwrap() - 18210.0).abs() < 1e-9);

    // Through the gate, an oversized ATR stop gets the same treatment.
    let wide = RiskEngine::from_series(
        vec![at(9, 0)],
        vec![1000.0 / 1.4],
        Some(vec![2000.0]),
        &RiskConfig {
            sl_tp: SlTpConfig::default(),
            risk_management: RiskManagementConfig {
                enabled: true,
                max_risk_percentile: 0.02,
                allow_exceed_limit: true,
            },
        },
    );
    match wide.assess(&signal_at(at(10, 0), 18250.0, SignalDirection::Buy)) {
        RiskDecision::Adjusted { profile, comment, .. } => {
            assert!((profile.stop_loss - 18210.0).abs() < 1e-6);
            assert!((profile.take_profit - 18330.0).abs() < 1e-6);
            assert_eq!(comment, "SL adjusted from 50.00% to 2.00% of annual range");
        }
        other => panic!("expected adjusted decision, got {other:?}"),
    }
}

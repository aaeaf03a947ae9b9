//! End-to-end pipeline runs on synthetic minute data.

use wbws_core::config::StrategyConfig;
use wbws_core::data::{generate_bars, DateRange, SyntheticConfig};
use wbws_core::domain::Bar;
use wbws_core::pipeline::{Disposition, Pipeline, Stage};

fn synthetic(days: usize) -> Vec<Bar> {
    generate_bars(&SyntheticConfig {
        seed: 2024,
        days,
        bars_per_day: 13 * 60,
        day_start_minute: 7 * 60 + 30,
        ..Default::default()
    })
}

fn config(toml: &str) -> StrategyConfig {
    StrategyConfig::from_toml_str(toml).unwrap()
}

#[test]
fn stage_counts_are_conserved() {
    let bars = synthetic(3);
    let cfg = config(
        r#"
        [risk.risk_management]
        enabled = true
        max_risk_percentile = 0.5
        "#,
    );
    let out = Pipeline::from_config(&cfg, &bars).unwrap().run(&bars).unwrap();

    assert_eq!(out.frame.len(), bars.len());
    assert_eq!(out.outcomes.len(), out.frame.events.len());
    assert!(!out.outcomes.is_empty(), "synthetic data should fire signals");

    let s = &out.stats;
    assert_eq!(s.trigger.input.buy, out.frame.buy_count());
    assert_eq!(s.trigger.input.sell, out.frame.sell_count());
    for stage in Stage::ALL {
        let c = s.stage(stage);
        assert_eq!(c.input.buy, c.approved.buy + c.rejected.buy, "{stage}");
        assert_eq!(c.input.sell, c.approved.sell + c.rejected.sell, "{stage}");
    }
    assert_eq!(s.time.input, s.trigger.approved);
    assert_eq!(s.momentum.input, s.time.approved);
    assert_eq!(s.risk.input, s.momentum.approved);
    assert_eq!(out.trades.len(), s.final_signals().total());
}

#[test]
fn outcomes_follow_trigger_order() {
    let bars = synthetic(2);
    let out = Pipeline::from_config(&StrategyConfig::default(), &bars)
        .unwrap()
        .run(&bars)
        .unwrap();
    let ids: Vec<u64> = out.outcomes.iter().map(|o| o.event.id.0).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert!(out
        .outcomes
        .windows(2)
        .all(|w| w[0].event.timestamp < w[1].event.timestamp));
}

#[test]
fn runs_are_deterministic() {
    let bars = synthetic(2);
    let pipeline = Pipeline::from_config(&StrategyConfig::default(), &bars).unwrap();
    let a = pipeline.run(&bars).unwrap();
    let b = pipeline.run(&bars).unwrap();
    assert_eq!(a.trades, b.trades);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn disabled_filters_pass_every_raw_signal_to_risk() {
    let bars = synthetic(2);
    let cfg = config(
        r#"
        [filters.rsi]
        enabled = false

        [time_filter]
        enabled = false
        "#,
    );
    let out = Pipeline::from_config(&cfg, &bars).unwrap().run(&bars).unwrap();
    assert_eq!(out.stats.risk.input, out.stats.trigger.approved);
    // Without risk management every signal with ATR gets through.
    for outcome in &out.outcomes {
        match &outcome.disposition {
            Disposition::Approved { comment, .. } => {
                assert_eq!(comment, "Risk management disabled")
            }
            Disposition::Rejected { stage, .. } => assert_eq!(*stage, Stage::Risk),
            other => panic!("non-terminal disposition {other:?}"),
        }
    }
}

#[test]
fn trades_respect_direction_and_session() {
    let bars = synthetic(3);
    let cfg = StrategyConfig::default();
    let out = Pipeline::from_config(&cfg, &bars).unwrap().run(&bars).unwrap();
    let session = cfg.session_filter().unwrap();
    for trade in &out.trades {
        assert!(session.is_in_session(trade.timestamp));
        if trade.direction.is_long() {
            assert!(trade.stop_loss < trade.entry_price && trade.take_profit > trade.entry_price);
        } else {
            assert!(trade.stop_loss > trade.entry_price && trade.take_profit < trade.entry_price);
        }
        assert!((trade.target_distance - 2.0 * trade.stop_distance).abs() < 1e-9);
    }
}

#[test]
fn window_run_uses_full_history_for_risk() {
    let history = synthetic(30);
    let window = DateRange::new(Some(history[25 * 780].date()), None).unwrap();
    let bars = window.apply(&history);

    let cfg = config(
        r#"
        [risk.risk_management]
        enabled = true
        max_risk_percentile = 0.9
        "#,
    );
    let out = Pipeline::from_config(&cfg, &history).unwrap().run(bars).unwrap();
    assert_eq!(out.frame.len(), bars.len());
    // 25 prior days exist, so every approved trade saw an annual range.
    for trade in &out.trades {
        assert!(trade.comment.starts_with("SL: "), "{}", trade.comment);
    }
}

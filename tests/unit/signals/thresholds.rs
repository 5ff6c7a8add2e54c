//! Unit tests for threshold rules

use chrono::Utc;
use marketwatch::config::ThresholdConfig;
use marketwatch::history::PriceHistory;
use marketwatch::models::{AlertKind, PayloadValue, Quote, Severity};
use marketwatch::signals::ThresholdEvaluator;

fn evaluator() -> ThresholdEvaluator {
    ThresholdEvaluator::new(ThresholdConfig::default())
}

fn text(value: &str) -> Option<PayloadValue> {
    Some(PayloadValue::Text(value.to_string()))
}

#[test]
fn price_change_medium_above_threshold() {
    let quote = Quote::new("AAPL", 103.0, 100.0, 1_000.0);
    let alert = evaluator().price_change(&quote, Utc::now()).unwrap();

    assert_eq!(alert.kind, AlertKind::PriceChange);
    assert_eq!(alert.severity, Severity::Medium);
    assert_eq!(alert.field("changePct").cloned(), text("3.00"));
    assert_eq!(alert.field("direction").cloned(), text("up"));
}

#[test]
fn price_change_high_at_double_threshold() {
    let quote = Quote::new("AAPL", 105.0, 100.0, 1_000.0);
    let alert = evaluator().price_change(&quote, Utc::now()).unwrap();
    assert_eq!(alert.severity, Severity::High);
    assert_eq!(alert.field("changePct").cloned(), text("5.00"));
}

#[test]
fn price_change_down_move() {
    let quote = Quote::new("AAPL", 97.0, 100.0, 1_000.0);
    let alert = evaluator().price_change(&quote, Utc::now()).unwrap();
    assert_eq!(alert.field("changePct").cloned(), text("-3.00"));
    assert_eq!(alert.field("direction").cloned(), text("down"));
}

#[test]
fn price_change_below_threshold_or_no_base() {
    let evaluator = evaluator();
    assert!(evaluator
        .price_change(&Quote::new("AAPL", 101.0, 100.0, 1_000.0), Utc::now())
        .is_none());
    assert!(evaluator
        .price_change(&Quote::new("AAPL", 101.0, 0.0, 1_000.0), Utc::now())
        .is_none());
}

#[test]
fn volume_spike_requires_strictly_greater_volume() {
    let evaluator = evaluator();
    let now = Utc::now();

    let at_limit = Quote::new("AAPL", 100.0, 100.0, 2_000.0);
    assert!(evaluator.volume_spike(&at_limit, Some(1_000.0), now).is_none());

    let spike = Quote::new("AAPL", 100.0, 100.0, 2_500.0);
    let alert = evaluator.volume_spike(&spike, Some(1_000.0), now).unwrap();
    assert_eq!(alert.severity, Severity::Medium);
    assert_eq!(alert.field("multiple").cloned(), text("2.50"));
    assert_eq!(alert.field("avgVolume"), Some(&PayloadValue::Number(1_000.0)));
}

#[test]
fn volume_spike_escalates_at_three_times() {
    let quote = Quote::new("AAPL", 100.0, 100.0, 3_500.0);
    let alert = evaluator().volume_spike(&quote, Some(1_000.0), Utc::now()).unwrap();
    assert_eq!(alert.severity, Severity::High);
}

#[test]
fn volume_spike_skipped_without_average() {
    let quote = Quote::new("AAPL", 100.0, 100.0, 1e9);
    assert!(evaluator().volume_spike(&quote, None, Utc::now()).is_none());
    assert!(evaluator().volume_spike(&quote, Some(0.0), Utc::now()).is_none());
}

#[test]
fn rsi_overbought_and_oversold() {
    let evaluator = evaluator();
    let now = Utc::now();

    let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    let alert = evaluator.rsi("AAPL", &rising, now).unwrap();
    assert_eq!(alert.kind, AlertKind::Rsi);
    assert_eq!(alert.severity, Severity::Medium);
    assert_eq!(alert.field("condition").cloned(), text("overbought"));
    assert_eq!(alert.field("rsi").cloned(), text("100.00"));

    let falling: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
    let alert = evaluator.rsi("AAPL", &falling, now).unwrap();
    assert_eq!(alert.field("condition").cloned(), text("oversold"));
}

#[test]
fn rsi_skipped_when_neutral_or_short() {
    let evaluator = evaluator();
    let balanced: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
    assert!(evaluator.rsi("AAPL", &balanced, Utc::now()).is_none());
    assert!(evaluator.rsi("AAPL", &[100.0; 10], Utc::now()).is_none());
}

#[test]
fn ema_cross_fires_on_the_crossing_bar_only() {
    let evaluator = evaluator();
    let mut closes = vec![100.0; 30];
    closes.push(110.0);

    let alert = evaluator.ema_cross("AAPL", &closes, Utc::now()).unwrap();
    assert_eq!(alert.kind, AlertKind::MaCross);
    assert_eq!(alert.severity, Severity::High);
    assert_eq!(alert.field("average").cloned(), text("ema"));
    assert_eq!(alert.field("direction").cloned(), text("bullish"));
    assert_eq!(alert.field("shortPeriod"), Some(&PayloadValue::Number(9.0)));

    closes.push(110.0);
    assert!(evaluator.ema_cross("AAPL", &closes, Utc::now()).is_none());
}

#[test]
fn sma_death_cross() {
    let mut closes = vec![100.0; 200];
    closes.push(90.0);

    let alert = evaluator().sma_cross("AAPL", &closes, Utc::now()).unwrap();
    assert_eq!(alert.field("cross").cloned(), text("death"));
    assert_eq!(alert.field("direction").cloned(), text("bearish"));
    assert_eq!(alert.field("average").cloned(), text("sma"));
}

#[test]
fn evaluate_runs_rules_in_fixed_order() {
    let mut closes = vec![100.0; 200];
    closes.push(110.0);
    let history = PriceHistory::from_closes(closes, Some(1_000.0));
    let quote = Quote::new("AAPL", 110.0, 100.0, 5_000.0);

    let kinds: Vec<AlertKind> = evaluator()
        .evaluate(&quote, &history, Utc::now())
        .iter()
        .map(|alert| alert.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            AlertKind::PriceChange,
            AlertKind::VolumeSpike,
            AlertKind::Rsi,
            AlertKind::MaCross,
            AlertKind::MaCross,
        ]
    );
}

#[test]
fn evaluate_quiet_market_emits_nothing() {
    let history = PriceHistory::from_closes(vec![100.0; 5], None);
    let quote = Quote::new("AAPL", 100.5, 100.0, 1_000.0);
    assert!(evaluator().evaluate(&quote, &history, Utc::now()).is_empty());
}

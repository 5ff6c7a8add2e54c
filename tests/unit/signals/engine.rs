//! Unit tests for signal engine

use chrono::{Duration, TimeZone, Utc};
use marketwatch::config::{SelectionConfig, ThresholdConfig};
use marketwatch::history::PriceHistory;
use marketwatch::models::{AlertKind, Position, Quote, Severity};
use marketwatch::signals::{EngineState, SignalEngine};

fn engine() -> SignalEngine {
    SignalEngine::new(ThresholdConfig::default(), SelectionConfig::default())
}

fn busy_history() -> PriceHistory {
    let mut closes = vec![100.0; 200];
    closes.push(110.0);
    PriceHistory::from_closes(closes, Some(1_000.0))
}

#[test]
fn test_evaluate_combines_thresholds_and_positions() {
    let now = Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap();
    let quote = Quote::new("AAPL", 110.0, 100.0, 5_000.0);
    let positions = vec![Position::new("AAPL").with_stop_loss(108.0)];
    let mut state = EngineState::new();

    let outcome = engine().evaluate(&quote, &busy_history(), &positions, &mut state.ledger, now);
    let kinds: Vec<AlertKind> = outcome.selected.iter().map(|a| a.kind).collect();

    assert_eq!(
        kinds,
        vec![AlertKind::NearStopLoss, AlertKind::MaCross, AlertKind::VolumeSpike]
    );
    assert_eq!(outcome.selected[0].severity, Severity::Critical);
    // Second maCross is a same-kind duplicate; rsi and priceChange fall to the cap.
    assert_eq!(outcome.suppressed, 1);
    assert_eq!(outcome.truncated, 2);
}

#[test]
fn test_evaluate_quiet_after_first_fire() {
    let now = Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap();
    let quote = Quote::new("AAPL", 110.0, 100.0, 5_000.0);
    let mut state = EngineState::new();
    let engine = engine();

    let first = engine.evaluate(&quote, &busy_history(), &[], &mut state.ledger, now);
    assert!(!first.selected.is_empty());

    let later = now + Duration::minutes(5);
    let second = engine.evaluate(&quote, &busy_history(), &[], &mut state.ledger, later);
    assert!(second.selected.is_empty());
}

#[test]
fn test_evaluate_with_short_history() {
    let quote = Quote::new("AAPL", 100.0, 100.0, 1_000.0);
    let history = PriceHistory::from_closes(vec![100.0; 3], None);
    let mut state = EngineState::new();

    let outcome = engine().evaluate(&quote, &history, &[], &mut state.ledger, Utc::now());
    assert!(outcome.selected.is_empty());
    assert!(state.ledger.is_empty());
}

#[test]
fn test_engine_exposes_configuration() {
    let engine = engine();
    assert_eq!(engine.thresholds().config().ema_short, 9);
    assert_eq!(engine.selector().config().max_alerts, 3);
}

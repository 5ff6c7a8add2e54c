//! Unit tests for crossover detection

use marketwatch::indicators::trend::{crossover_on_series, detect_crossover, sma_pair, CrossoverType};
use marketwatch::models::AveragePair;

#[test]
fn test_bullish_crossover() {
    let previous = AveragePair::new(9.0, 10.0);
    let current = AveragePair::new(11.0, 10.0);
    assert_eq!(detect_crossover(previous, current), CrossoverType::Bullish);
}

#[test]
fn test_bearish_crossover() {
    let previous = AveragePair::new(11.0, 10.0);
    let current = AveragePair::new(9.5, 10.0);
    assert_eq!(detect_crossover(previous, current), CrossoverType::Bearish);
}

#[test]
fn test_touch_then_break_counts_as_cross() {
    let previous = AveragePair::new(10.0, 10.0);
    assert_eq!(
        detect_crossover(previous, AveragePair::new(10.5, 10.0)),
        CrossoverType::Bullish
    );
    assert_eq!(
        detect_crossover(previous, AveragePair::new(9.5, 10.0)),
        CrossoverType::Bearish
    );
}

#[test]
fn test_no_crossover_when_order_unchanged() {
    let previous = AveragePair::new(11.0, 10.0);
    let current = AveragePair::new(12.0, 10.0);
    assert_eq!(detect_crossover(previous, current), CrossoverType::None);
}

#[test]
fn test_series_crossover_fires_once() {
    let pair = |series: &[f64]| sma_pair(series, 2, 3);

    let crossing = [10.0, 10.0, 10.0, 13.0];
    let (crossover, current) = crossover_on_series(&crossing, pair).unwrap();
    assert_eq!(crossover, CrossoverType::Bullish);
    assert!((current.short - 11.5).abs() < 1e-12);
    assert!((current.long - 11.0).abs() < 1e-12);

    let after = [10.0, 10.0, 10.0, 13.0, 14.0];
    let (crossover, _) = crossover_on_series(&after, pair).unwrap();
    assert_eq!(crossover, CrossoverType::None);
}

#[test]
fn test_series_too_short_for_previous_snapshot() {
    let pair = |series: &[f64]| sma_pair(series, 2, 3);
    assert!(crossover_on_series(&[10.0, 11.0, 12.0], pair).is_none());
    assert!(crossover_on_series(&[], pair).is_none());
}

//! Unit tests for EMA indicator

use marketwatch::indicators::trend::{calculate_ema, calculate_emas, ema_pair};

fn create_test_closes(count: usize, base_price: f64) -> Vec<f64> {
    (0..count).map(|i| base_price + i as f64 * 0.1).collect()
}

#[test]
fn test_ema_insufficient_data() {
    let closes = create_test_closes(10, 100.0);
    assert!(calculate_ema(&closes, 20).is_none());
}

#[test]
fn test_ema_sufficient_data() {
    let closes = create_test_closes(50, 100.0);
    let ema = calculate_ema(&closes, 12).unwrap();
    assert_eq!(ema.period, 12);
    assert!(ema.value.is_finite());
}

#[test]
fn test_ema_constant_series() {
    let ema = calculate_ema(&[42.0; 30], 9).unwrap();
    assert!((ema.value - 42.0).abs() < 1e-9);
}

#[test]
fn test_ema_exactly_period_is_simple_average() {
    let ema = calculate_ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 5).unwrap();
    assert!((ema.value - 3.0).abs() < 1e-12);
}

#[test]
fn test_ema_lags_a_rising_series() {
    let closes = create_test_closes(50, 100.0);
    let ema = calculate_ema(&closes, 9).unwrap();
    assert!(ema.value < *closes.last().unwrap());
}

#[test]
fn test_calculate_multiple_emas_skips_uncomputable() {
    let closes = create_test_closes(30, 100.0);
    let emas = calculate_emas(&closes, &[9, 21, 50]);
    assert_eq!(emas.len(), 2);
    assert_eq!(emas[0].period, 9);
    assert_eq!(emas[1].period, 21);
}

#[test]
fn test_ema_pair_requires_long_period() {
    let closes = create_test_closes(15, 100.0);
    assert!(ema_pair(&closes, 9, 21).is_none());

    let closes = create_test_closes(40, 100.0);
    let pair = ema_pair(&closes, 9, 21).unwrap();
    assert!(pair.short > pair.long);
}

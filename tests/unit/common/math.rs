//! Unit tests for shared numeric helpers

use marketwatch::common::math::{ema, ema_multiplier, percent_change, sma};

#[test]
fn sma_uses_trailing_window() {
    let values = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(sma(&values, 2), Some(3.5));
    assert_eq!(sma(&values, 4), Some(2.5));
}

#[test]
fn sma_requires_enough_values() {
    assert_eq!(sma(&[1.0, 2.0], 3), None);
    assert_eq!(sma(&[1.0, 2.0], 0), None);
}

#[test]
fn ema_is_seeded_with_simple_average() {
    // Seed is mean(1, 2, 3) = 2, then (4 - 2) * 0.5 + 2.
    assert_eq!(ema(&[1.0, 2.0, 3.0], 3), Some(2.0));
    assert_eq!(ema(&[1.0, 2.0, 3.0, 4.0], 3), Some(3.0));
}

#[test]
fn ema_multiplier_matches_period() {
    assert!((ema_multiplier(9) - 0.2).abs() < 1e-12);
    assert!((ema_multiplier(3) - 0.5).abs() < 1e-12);
}

#[test]
fn percent_change_rejects_non_positive_base() {
    let change = percent_change(103.0, 100.0).unwrap();
    assert!((change - 3.0).abs() < 1e-9);
    assert_eq!(percent_change(10.0, 0.0), None);
    assert_eq!(percent_change(10.0, -5.0), None);
}

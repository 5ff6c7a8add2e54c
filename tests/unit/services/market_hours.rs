//! Unit tests for the market hours gate

use chrono::{NaiveTime, TimeZone, Utc};
use marketwatch::services::{AlwaysOpen, MarketHoursGate, SessionGate};

fn new_york() -> SessionGate {
    SessionGate::new(
        NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        -300,
    )
    .unwrap()
}

#[test]
fn open_during_weekday_session() {
    // Monday 2024-01-08, 10:00 local.
    let now = Utc.with_ymd_and_hms(2024, 1, 8, 15, 0, 0).unwrap();
    assert!(new_york().is_open(now));
}

#[test]
fn open_is_inclusive_close_is_exclusive() {
    let gate = new_york();
    assert!(!gate.is_open(Utc.with_ymd_and_hms(2024, 1, 8, 14, 29, 59).unwrap()));
    assert!(gate.is_open(Utc.with_ymd_and_hms(2024, 1, 8, 14, 30, 0).unwrap()));
    assert!(!gate.is_open(Utc.with_ymd_and_hms(2024, 1, 8, 21, 0, 0).unwrap()));
}

#[test]
fn closed_on_weekends() {
    // Saturday 2024-01-06, 11:00 local.
    let now = Utc.with_ymd_and_hms(2024, 1, 6, 16, 0, 0).unwrap();
    assert!(!new_york().is_open(now));
}

#[test]
fn always_open_gate() {
    let saturday = Utc.with_ymd_and_hms(2024, 1, 6, 3, 0, 0).unwrap();
    assert!(AlwaysOpen.is_open(saturday));
}

#[test]
fn rejects_out_of_range_offset() {
    let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
    let close = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
    assert!(SessionGate::new(open, close, 24 * 60).is_none());
    assert!(SessionGate::new(open, close, i32::MAX).is_none());
    assert!(SessionGate::new(open, close, i32::MIN).is_none());
}

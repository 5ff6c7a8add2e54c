//! Unit tests for scheduler interval handling

use marketwatch::core::scheduler::interval_to_cron;

#[test]
fn test_sub_minute_intervals_use_seconds_field() {
    assert_eq!(interval_to_cron(30).as_deref(), Some("*/30 * * * * *"));
    assert_eq!(interval_to_cron(1).as_deref(), Some("*/1 * * * * *"));
}

#[test]
fn test_minute_intervals() {
    assert_eq!(interval_to_cron(300).as_deref(), Some("0 */5 * * * *"));
    assert_eq!(interval_to_cron(60).as_deref(), Some("0 */1 * * * *"));
}

#[test]
fn test_hour_and_day_intervals() {
    assert_eq!(interval_to_cron(3600).as_deref(), Some("0 0 */1 * * *"));
    assert_eq!(interval_to_cron(7200).as_deref(), Some("0 0 */2 * * *"));
    assert_eq!(interval_to_cron(86_400).as_deref(), Some("0 0 0 * * *"));
}

#[test]
fn test_uneven_intervals_are_rejected() {
    for secs in [0, 45, 90, 420, 5400, 18_000, 172_800] {
        assert_eq!(interval_to_cron(secs), None, "{}s should be rejected", secs);
    }
}

#[test]
fn test_generated_expressions_parse() {
    use std::str::FromStr;
    for secs in [5, 30, 60, 300, 900, 3600, 21_600, 86_400] {
        let expr = interval_to_cron(secs).unwrap();
        assert!(cron::Schedule::from_str(&expr).is_ok(), "{} should parse", expr);
    }
}

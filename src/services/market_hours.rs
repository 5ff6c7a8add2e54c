//! Gate deciding whether a scan cycle should run at a given instant.

use crate::config::SessionConfig;
use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Utc, Weekday};

pub trait MarketHoursGate: Send + Sync {
    fn is_open(&self, now: DateTime<Utc>) -> bool;
}

pub struct AlwaysOpen;

impl MarketHoursGate for AlwaysOpen {
    fn is_open(&self, _now: DateTime<Utc>) -> bool {
        true
    }
}

/// Weekdays between `open` (inclusive) and `close` (exclusive), local to a
/// fixed UTC offset. No holiday calendar.
pub struct SessionGate {
    open: NaiveTime,
    close: NaiveTime,
    offset: FixedOffset,
}

impl SessionGate {
    pub fn new(open: NaiveTime, close: NaiveTime, utc_offset_minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)?;
        Some(Self { open, close, offset })
    }

    pub fn from_config(config: &SessionConfig) -> Option<Self> {
        Self::new(config.open, config.close, config.utc_offset_minutes)
    }
}

impl MarketHoursGate for SessionGate {
    fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.offset);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let time = local.time();
        time >= self.open && time < self.close
    }
}

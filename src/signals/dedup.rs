//! Alert deduplication and per-symbol selection.

use crate::config::SelectionConfig;
use crate::models::{Alert, AlertKind};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Last time each (symbol, kind) pair got through deduplication.
///
/// Entries are never evicted; anything older than the window simply stops
/// suppressing.
#[derive(Debug, Default, Clone)]
pub struct DedupLedger {
    last_fired: HashMap<(String, AlertKind), DateTime<Utc>>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_fired(&self, symbol: &str, kind: AlertKind) -> Option<DateTime<Utc>> {
        self.last_fired.get(&(symbol.to_string(), kind)).copied()
    }

    /// Suppressed iff the pair last fired strictly after `now - window`.
    /// A window reaching past the representable range suppresses.
    pub fn is_suppressed(&self, symbol: &str, kind: AlertKind, now: DateTime<Utc>, window: Duration) -> bool {
        self.last_fired(symbol, kind)
            .map(|last| match now.checked_sub_signed(window) {
                Some(cutoff) => last > cutoff,
                None => true,
            })
            .unwrap_or(false)
    }

    fn record(&mut self, symbol: &str, kind: AlertKind, now: DateTime<Utc>) {
        self.last_fired.insert((symbol.to_string(), kind), now);
    }

    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }
}

/// Counts from one selection pass, for logging and metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionOutcome {
    pub selected: Vec<Alert>,
    pub suppressed: usize,
    pub truncated: usize,
}

/// Sole writer of the [`DedupLedger`].
pub struct AlertSelector {
    config: SelectionConfig,
}

impl AlertSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Rank of `kind` in the configured priority; unlisted kinds sort last.
    pub fn rank(&self, kind: AlertKind) -> usize {
        self.config
            .priority
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.config.priority.len())
    }

    /// Dedup, order by priority (stable), then cap.
    ///
    /// Every candidate that survives dedup is recorded in the ledger before
    /// the cap is applied, so truncated kinds start their window too.
    pub fn select(
        &self,
        ledger: &mut DedupLedger,
        symbol: &str,
        candidates: Vec<Alert>,
        now: DateTime<Utc>,
    ) -> SelectionOutcome {
        let mut kept = Vec::with_capacity(candidates.len());
        let mut suppressed = 0;

        for alert in candidates {
            if ledger.is_suppressed(symbol, alert.kind, now, self.config.dedup_window) {
                suppressed += 1;
                continue;
            }
            ledger.record(symbol, alert.kind, now);
            kept.push(alert);
        }

        kept.sort_by_key(|alert| self.rank(alert.kind));
        let truncated = kept.len().saturating_sub(self.config.max_alerts);
        kept.truncate(self.config.max_alerts);

        SelectionOutcome {
            selected: kept,
            suppressed,
            truncated,
        }
    }
}

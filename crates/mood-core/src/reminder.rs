//! Inactivity reminder decision.
//!
//! A reminder is due when nothing has ever been recorded, or when more than
//! `threshold` has elapsed since the most recent entry. The decision is a
//! level-triggered predicate: it is re-derived on every check, holds no
//! state, and keeps answering `Due` until a new entry arrives. Deciding
//! whether to notify again is left to the dispatcher.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::entry::Entry;
use crate::store::{EntryStore, StoreError};

/// Outcome of a reminder check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    Due,
    NotDue,
}

impl ReminderState {
    /// Evaluates the reminder from the latest entry time.
    ///
    /// Elapsed time equal to `threshold` is not due. An entry stamped in the
    /// future counts as fresh.
    pub fn evaluate(
        last_entry_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> Self {
        match last_entry_at {
            None => Self::Due,
            Some(last) if now.signed_duration_since(last) > threshold => Self::Due,
            Some(_) => Self::NotDue,
        }
    }

    pub const fn is_due(self) -> bool {
        matches!(self, Self::Due)
    }
}

impl fmt::Display for ReminderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Due => write!(f, "due"),
            Self::NotDue => write!(f, "not due"),
        }
    }
}

/// Returns whether a reminder should fire given the most recent entry.
pub fn is_reminder_due(most_recent: Option<&Entry>, now: DateTime<Utc>, threshold: Duration) -> bool {
    ReminderState::evaluate(most_recent.map(|e| e.timestamp), now, threshold).is_due()
}

/// Reads the latest entry from `store` and evaluates the reminder.
pub fn check_reminder<S: EntryStore + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
    threshold: Duration,
) -> Result<ReminderState, StoreError> {
    let last_entry_at = store.most_recent_entry()?.map(|e| e.timestamp);
    let state = ReminderState::evaluate(last_entry_at, now, threshold);
    tracing::debug!(?last_entry_at, %state, "evaluated reminder");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NewEntry;
    use crate::store::MemoryStore;
    use crate::types::{EntryId, Rating};
    use chrono::TimeZone;

    fn entry_at(timestamp: DateTime<Utc>) -> Entry {
        Entry {
            id: EntryId::new("entry-1").unwrap(),
            timestamp,
            rating: Rating::new(3).unwrap(),
            tags: std::collections::BTreeSet::new(),
            notes: None,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn no_entry_is_always_due() {
        for threshold in [Duration::zero(), Duration::seconds(15), Duration::hours(18)] {
            assert!(is_reminder_due(None, t0(), threshold));
            assert!(is_reminder_due(None, DateTime::<Utc>::MIN_UTC, threshold));
        }
    }

    #[test]
    fn boundary_is_strict() {
        let threshold = Duration::hours(18);
        let entry = entry_at(t0());

        let just_before = t0() + threshold - Duration::milliseconds(1);
        let exactly = t0() + threshold;
        let just_after = t0() + threshold + Duration::milliseconds(1);

        assert!(!is_reminder_due(Some(&entry), just_before, threshold));
        assert!(!is_reminder_due(Some(&entry), exactly, threshold));
        assert!(is_reminder_due(Some(&entry), just_after, threshold));
    }

    #[test]
    fn short_thresholds_work_for_demos() {
        let threshold = Duration::seconds(15);
        let entry = entry_at(t0());
        assert!(!is_reminder_due(Some(&entry), t0() + Duration::seconds(10), threshold));
        assert!(is_reminder_due(Some(&entry), t0() + Duration::seconds(16), threshold));
    }

    #[test]
    fn future_entry_is_not_due() {
        let entry = entry_at(t0() + Duration::hours(2));
        assert!(!is_reminder_due(Some(&entry), t0(), Duration::zero()));
    }

    #[test]
    fn repeated_checks_keep_reporting_due() {
        let threshold = Duration::hours(1);
        let now = t0() + Duration::hours(3);
        let first = ReminderState::evaluate(Some(t0()), now, threshold);
        let second = ReminderState::evaluate(Some(t0()), now, threshold);
        assert_eq!(first, ReminderState::Due);
        assert_eq!(first, second);
    }

    #[test]
    fn check_reminder_reads_latest_from_store() {
        let threshold = Duration::hours(18);
        let mut store = MemoryStore::new();
        assert_eq!(
            check_reminder(&store, t0(), threshold).unwrap(),
            ReminderState::Due
        );

        store
            .insert(NewEntry::new(4, ["walk"], None).unwrap().at(t0()))
            .unwrap();
        store
            .insert(
                NewEntry::new(2, ["work"], None)
                    .unwrap()
                    .at(t0() - Duration::days(3)),
            )
            .unwrap();

        assert_eq!(
            check_reminder(&store, t0() + Duration::hours(1), threshold).unwrap(),
            ReminderState::NotDue
        );
        assert_eq!(
            check_reminder(&store, t0() + Duration::hours(19), threshold).unwrap(),
            ReminderState::Due
        );
    }
}

//! The single authoritative queue state.
//!
//! [`StateStore`] owns one [`QueueState`] plus the clock and calendar used
//! to keep its stats dated "today". Every read goes through
//! [`StateStore::snapshot`] and every mutation through the processor, both
//! of which run [`StateStore::ensure_rollover`] first, so an observer can
//! never see stats belonging to a past civil day.
//!
//! The store is a plain owned value. The server wraps it in a mutex to get
//! a single writer; tests build a fresh one per case.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use turnero_types::{LastAction, NONE_SERVED, OperationKind, QueueState, Stats};

use crate::clock::{CivilCalendar, Clock, SystemClock};

/// Owner of the shared queue, stats, and last-action record.
pub struct StateStore {
    clock: Arc<dyn Clock>,
    calendar: CivilCalendar,
    state: QueueState,
}

impl StateStore {
    /// Create an empty store dated today according to `clock` and
    /// `calendar`.
    pub fn new(clock: Arc<dyn Clock>, calendar: CivilCalendar) -> Self {
        let today = calendar.date_of(clock.now());
        Self {
            clock,
            calendar,
            state: QueueState::fresh(today),
        }
    }

    /// Store on the host wall clock and the default calendar.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock), CivilCalendar::default())
    }

    /// The current instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Today's civil date.
    pub fn today(&self) -> NaiveDate {
        self.calendar.date_of(self.clock.now())
    }

    /// Reset the served counter if the civil day has changed.
    ///
    /// The last served name carries over across days. Returns `true` when
    /// a rollover happened. Calling it again on the same day is a no-op.
    pub fn ensure_rollover(&mut self) -> bool {
        let today = self.today();
        if self.state.stats.day == today {
            return false;
        }
        let previous = self.state.stats.day;
        let last_served = if self.state.stats.last_served.is_empty() {
            NONE_SERVED.to_owned()
        } else {
            core::mem::take(&mut self.state.stats.last_served)
        };
        self.state.stats = Stats {
            served_today: 0,
            last_served,
            day: today,
        };
        info!(%previous, %today, "Daily stats rolled over");
        true
    }

    /// The full current state, after any pending rollover.
    pub fn snapshot(&mut self) -> &QueueState {
        self.ensure_rollover();
        &self.state
    }

    /// Replace everything with an empty queue and zeroed stats dated today.
    pub fn reset(&mut self) {
        self.state = QueueState::fresh(self.today());
    }

    /// Number of waiting entries.
    pub fn len(&self) -> usize {
        self.state.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.state.queue.is_empty()
    }

    /// Stamp the last accepted mutation.
    pub(crate) fn record_action(&mut self, kind: OperationKind, by: &str) {
        self.state.last_action = Some(LastAction {
            kind,
            by: by.to_owned(),
            ts: self.clock.now(),
        });
    }

    /// Direct access for the processor, which validates before it writes.
    pub(crate) const fn state_mut(&mut self) -> &mut QueueState {
        &mut self.state
    }
}

impl core::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateStore")
            .field("calendar", &self.calendar)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use turnero_types::{Entry, EntryId};

    use super::*;
    use crate::clock::ManualClock;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn store_at(s: &str) -> (Arc<ManualClock>, StateStore) {
        let clock = Arc::new(ManualClock::new(at(s)));
        let store = StateStore::new(clock.clone(), CivilCalendar::default());
        (clock, store)
    }

    #[test]
    fn starts_empty_and_dated_today() {
        let (_, mut store) = store_at("2025-06-01T15:00:00Z");
        let snap = store.snapshot();
        assert!(snap.queue.is_empty());
        assert_eq!(snap.stats.served_today, 0);
        assert_eq!(snap.stats.last_served, NONE_SERVED);
        assert_eq!(snap.stats.day, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert!(snap.last_action.is_none());
    }

    #[test]
    fn rollover_zeroes_count_and_keeps_last_served() {
        let (clock, mut store) = store_at("2025-06-01T15:00:00Z");
        store.state_mut().stats.served_today = 7;
        store.state_mut().stats.last_served = String::from("Ana");

        assert!(!store.ensure_rollover());

        // 03:00 UTC on the 2nd is midnight in Buenos Aires.
        clock.set(at("2025-06-02T03:00:00Z"));
        let snap = store.snapshot();
        assert_eq!(snap.stats.served_today, 0);
        assert_eq!(snap.stats.last_served, "Ana");
        assert_eq!(snap.stats.day, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }

    #[test]
    fn rollover_is_idempotent_within_a_day() {
        let (clock, mut store) = store_at("2025-06-01T15:00:00Z");
        clock.advance(TimeDelta::days(1));
        assert!(store.ensure_rollover());
        assert!(!store.ensure_rollover());
        assert!(!store.ensure_rollover());
    }

    #[test]
    fn rollover_follows_the_civil_zone_not_utc() {
        let (clock, mut store) = store_at("2025-06-01T15:00:00Z");
        store.state_mut().stats.served_today = 3;
        // Past UTC midnight, still the 1st in Buenos Aires.
        clock.set(at("2025-06-02T01:30:00Z"));
        assert!(!store.ensure_rollover());
        assert_eq!(store.snapshot().stats.served_today, 3);
    }

    #[test]
    fn reset_discards_everything() {
        let (clock, mut store) = store_at("2025-06-01T15:00:00Z");
        store.state_mut().queue.push(Entry {
            id: EntryId::generate(),
            name: String::from("Ana"),
            created_at: clock.now(),
        });
        store.state_mut().stats.served_today = 4;
        store.state_mut().stats.last_served = String::from("Bob");
        store.record_action(OperationKind::Dequeue, "c1");

        assert!(!store.is_empty());
        clock.advance(TimeDelta::days(2));
        store.reset();

        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        let snap = store.snapshot();
        assert!(snap.queue.is_empty());
        assert_eq!(snap.stats, Stats::fresh(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()));
        assert!(snap.last_action.is_none());
    }
}

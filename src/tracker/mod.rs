//! Daily state tracker
//!
//! One tracker per subject. It owns the per-day taken/deleted/alert-sent
//! sets, the day-rollover transition, and the persistence of every
//! mutation. All read-mutate-persist sequences run under a single mutex,
//! which is the critical section that keeps a timer tick and a user action
//! from double-observing "not yet sent" state.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::alerts::{evaluate, AlertBatch, AlertConfig, Clock};
use crate::models::{Adherence, DailyState, DoseEvent, EventId};
use crate::store::{load_id_set, save_id_set, state_key, KvStore, StoreResult};

const FIELD_TAKEN: &str = "taken";
const FIELD_DELETED: &str = "deleted";
const FIELD_SENT_REMINDERS: &str = "sent_reminders";
const FIELD_SENT_MISSED: &str = "sent_missed";

/// Per-subject daily state tracker
pub struct DailyStateTracker {
    subject_id: String,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<DailyState>>,
}

impl DailyStateTracker {
    pub fn new(subject_id: impl Into<String>, store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            subject_id: subject_id.into(),
            store,
            clock,
            cached: Mutex::new(None),
        }
    }

    fn key(&self, date: NaiveDate, field: &str) -> String {
        state_key(&self.subject_id, &date.format("%Y-%m-%d").to_string(), field)
    }

    /// Load the persisted state for a date. Missing or malformed fields
    /// come back empty; a brand-new day starts from nothing.
    fn load(&self, date: NaiveDate) -> StoreResult<DailyState> {
        Ok(DailyState {
            date,
            taken: load_id_set(self.store.as_ref(), &self.key(date, FIELD_TAKEN))?,
            deleted: load_id_set(self.store.as_ref(), &self.key(date, FIELD_DELETED))?,
            sent_reminders: load_id_set(
                self.store.as_ref(),
                &self.key(date, FIELD_SENT_REMINDERS),
            )?,
            sent_missed: load_id_set(self.store.as_ref(), &self.key(date, FIELD_SENT_MISSED))?,
        })
    }

    fn persist(&self, state: &DailyState) -> StoreResult<()> {
        let date = state.date;
        save_id_set(self.store.as_ref(), &self.key(date, FIELD_TAKEN), &state.taken)?;
        save_id_set(self.store.as_ref(), &self.key(date, FIELD_DELETED), &state.deleted)?;
        save_id_set(
            self.store.as_ref(),
            &self.key(date, FIELD_SENT_REMINDERS),
            &state.sent_reminders,
        )?;
        save_id_set(
            self.store.as_ref(),
            &self.key(date, FIELD_SENT_MISSED),
            &state.sent_missed,
        )?;
        Ok(())
    }

    /// Run `f` against today's state under the tracker lock, persisting the
    /// result. Handles the day-rollover transition: a cached state whose
    /// date no longer matches today is discarded and today's state is
    /// loaded fresh.
    fn with_state<T>(&self, f: impl FnOnce(&mut DailyState) -> T) -> StoreResult<T> {
        let today = self.clock.now().date();
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut state = match cached.take() {
            Some(state) if state.date == today => state,
            Some(stale) => {
                info!(
                    subject = %self.subject_id,
                    stale_date = %stale.date,
                    %today,
                    "day rollover, resetting daily state"
                );
                self.load(today)?
            }
            None => self.load(today)?,
        };

        let result = f(&mut state);
        self.persist(&state)?;
        *cached = Some(state);
        Ok(result)
    }

    /// Snapshot of today's state.
    pub fn state(&self) -> StoreResult<DailyState> {
        self.with_state(|state| state.clone())
    }

    /// Mark a dose taken. Returns false (no-op) if the event was already
    /// taken or has been dismissed for the day.
    pub fn mark_taken(&self, event_id: &EventId) -> StoreResult<bool> {
        self.with_state(|state| {
            if state.deleted.contains(event_id) {
                return false;
            }
            let inserted = state.taken.insert(event_id.clone());
            if inserted {
                debug!(subject = %self.subject_id, %event_id, "dose marked taken");
            }
            inserted
        })
    }

    /// Unmark a previously taken dose.
    pub fn unmark_taken(&self, event_id: &EventId) -> StoreResult<bool> {
        self.with_state(|state| state.taken.remove(event_id))
    }

    /// Dismiss an event for the rest of the day. The id is removed from the
    /// taken set and stays excluded even if the schedule is re-derived.
    pub fn delete_event(&self, event_id: &EventId) -> StoreResult<()> {
        self.with_state(|state| {
            state.taken.remove(event_id);
            state.deleted.insert(event_id.clone());
            debug!(subject = %self.subject_id, %event_id, "dose event dismissed for today");
        })
    }

    /// Adherence for today against the derived schedule.
    ///
    /// Deleted events leave the denominator; taken ids that no longer match
    /// any derived event (prescription changed mid-day) leave the numerator.
    pub fn adherence(&self, events: &[DoseEvent]) -> StoreResult<Adherence> {
        self.with_state(|state| {
            let remaining: Vec<&EventId> = events
                .iter()
                .map(|e| &e.id)
                .filter(|id| !state.deleted.contains(*id))
                .collect();
            let taken = remaining.iter().filter(|id| state.taken.contains(**id)).count();
            Adherence::compute(taken, remaining.len())
        })
    }

    /// Evaluate the alert rules for this tick and record sent keys, all
    /// inside the critical section. The returned batch is already recorded;
    /// the caller dispatches it without holding the lock.
    pub fn run_alert_cycle(
        &self,
        events: &[DoseEvent],
        config: &AlertConfig,
    ) -> StoreResult<AlertBatch> {
        let now = self.clock.now();
        self.with_state(|state| evaluate(events, state, now, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::ManualClock;
    use crate::models::Medicine;
    use crate::schedule::derive_schedule;
    use crate::store::MemoryStore;

    fn tracker_at(timestamp: &str) -> (DailyStateTracker, Arc<ManualClock>, Arc<MemoryStore>) {
        let clock = Arc::new(ManualClock::at(timestamp));
        let store = Arc::new(MemoryStore::new());
        let tracker = DailyStateTracker::new("alice", store.clone(), clock.clone());
        (tracker, clock, store)
    }

    fn three_daily_events() -> Vec<crate::models::DoseEvent> {
        derive_schedule(&[Medicine::new("med-1", "Amoxicillin", "500mg", "3x daily")])
    }

    #[test]
    fn test_mark_and_unmark_taken() {
        let (tracker, _, _) = tracker_at("2024-01-01 08:00");
        let id = "med-1-0".to_string();

        assert!(tracker.mark_taken(&id).unwrap());
        assert!(!tracker.mark_taken(&id).unwrap());
        assert!(tracker.state().unwrap().taken.contains(&id));

        assert!(tracker.unmark_taken(&id).unwrap());
        assert!(tracker.state().unwrap().taken.is_empty());
    }

    #[test]
    fn test_mark_taken_on_deleted_event_is_noop() {
        let (tracker, _, _) = tracker_at("2024-01-01 08:00");
        let id = "med-1-0".to_string();

        tracker.delete_event(&id).unwrap();
        assert!(!tracker.mark_taken(&id).unwrap());
        assert!(tracker.state().unwrap().taken.is_empty());
    }

    #[test]
    fn test_delete_removes_from_taken() {
        let (tracker, _, _) = tracker_at("2024-01-01 08:00");
        let id = "med-1-0".to_string();

        tracker.mark_taken(&id).unwrap();
        tracker.delete_event(&id).unwrap();

        let state = tracker.state().unwrap();
        assert!(!state.taken.contains(&id));
        assert!(state.deleted.contains(&id));
    }

    #[test]
    fn test_adherence_excludes_deleted_from_denominator() {
        let (tracker, _, _) = tracker_at("2024-01-01 08:00");
        let events = three_daily_events();

        tracker.mark_taken(&events[0].id).unwrap();
        assert_eq!(tracker.adherence(&events).unwrap(), Adherence::compute(1, 3));

        // Dismissing the evening dose shrinks the denominator even though
        // derivation would still regenerate the event.
        tracker.delete_event(&events[2].id).unwrap();
        assert_eq!(tracker.adherence(&events).unwrap(), Adherence::compute(1, 2));
    }

    #[test]
    fn test_adherence_empty_schedule_is_zero() {
        let (tracker, _, _) = tracker_at("2024-01-01 08:00");
        let adherence = tracker.adherence(&[]).unwrap();
        assert_eq!(adherence.pct, 0);
        assert_eq!(adherence.total, 0);
    }

    #[test]
    fn test_day_rollover_resets_all_sets() {
        let (tracker, clock, _) = tracker_at("2024-01-01 08:00");
        let events = three_daily_events();

        tracker.mark_taken(&events[0].id).unwrap();
        tracker.delete_event(&events[1].id).unwrap();
        tracker
            .run_alert_cycle(&events, &AlertConfig::default())
            .unwrap();

        clock.advance_to("2024-01-02 07:00");
        let state = tracker.state().unwrap();
        assert_eq!(state.date.to_string(), "2024-01-02");
        assert!(state.taken.is_empty());
        assert!(state.deleted.is_empty());
        assert!(state.sent_reminders.is_empty());
        assert!(state.sent_missed.is_empty());
    }

    #[test]
    fn test_midday_reload_restores_state() {
        let clock = Arc::new(ManualClock::at("2024-01-01 09:00"));
        let store = Arc::new(MemoryStore::new());

        {
            let tracker = DailyStateTracker::new("alice", store.clone(), clock.clone());
            tracker.mark_taken(&"med-1-0".to_string()).unwrap();
            tracker.delete_event(&"med-1-2".to_string()).unwrap();
        }

        // Fresh tracker over the same store: exact state comes back.
        let tracker = DailyStateTracker::new("alice", store, clock);
        let state = tracker.state().unwrap();
        assert!(state.taken.contains("med-1-0"));
        assert!(state.deleted.contains("med-1-2"));
    }

    #[test]
    fn test_subjects_are_isolated() {
        let clock = Arc::new(ManualClock::at("2024-01-01 09:00"));
        let store = Arc::new(MemoryStore::new());
        let alice = DailyStateTracker::new("alice", store.clone(), clock.clone());
        let grandma = DailyStateTracker::new("grandma", store, clock);

        alice.mark_taken(&"med-1-0".to_string()).unwrap();
        assert!(grandma.state().unwrap().taken.is_empty());
    }

    #[test]
    fn test_corrupt_persisted_state_degrades_to_fresh_day() {
        let clock = Arc::new(ManualClock::at("2024-01-01 09:00"));
        let store = Arc::new(MemoryStore::new());
        store.set("alice:2024-01-01:taken", "not json at all").unwrap();

        let tracker = DailyStateTracker::new("alice", store, clock);
        let state = tracker.state().unwrap();
        assert!(state.taken.is_empty());
    }
}

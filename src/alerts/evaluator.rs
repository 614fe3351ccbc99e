//! Alert evaluation
//!
//! Runs once per tick (and once on load) against the day's dose events and
//! tracking state, and decides which reminders and missed-dose alerts are
//! due. Sent keys are recorded into the state in the same pass, so an event
//! alerts at most once per day no matter how many ticks observe it.
//!
//! The caller is expected to invoke this under the tracker's lock and
//! persist the mutated state before dispatching, which is what makes the
//! at-most-once guarantee hold across reentrant ticks.

use chrono::{Duration, NaiveDateTime};

use crate::models::{DailyState, DoseEvent, EventId};

/// Alert timing configuration
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// How long before the scheduled time the reminder window opens.
    pub reminder_lead: Duration,
    /// How long after the scheduled time a dose counts as missed.
    pub missed_grace: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            reminder_lead: Duration::minutes(15),
            missed_grace: Duration::minutes(30),
        }
    }
}

/// Alerts due this tick
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AlertBatch {
    pub reminders: Vec<EventId>,
    pub missed: Vec<EventId>,
}

impl AlertBatch {
    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty() && self.missed.is_empty()
    }
}

/// Evaluate the alert rules for one subject's day.
///
/// Events already taken or deleted never alert. Each emitted id is recorded
/// in the corresponding sent set before this function returns.
pub fn evaluate(
    events: &[DoseEvent],
    state: &mut DailyState,
    now: NaiveDateTime,
    config: &AlertConfig,
) -> AlertBatch {
    let mut batch = AlertBatch::default();

    for event in events {
        if state.taken.contains(&event.id) || state.deleted.contains(&event.id) {
            continue;
        }

        let scheduled = state.date.and_time(event.scheduled_time);

        // Reminder window: [scheduled - lead, scheduled)
        if now >= scheduled - config.reminder_lead
            && now < scheduled
            && state.sent_reminders.insert(event.id.clone())
        {
            batch.reminders.push(event.id.clone());
        }

        // Missed: grace period elapsed with the dose still untaken
        if now >= scheduled + config.missed_grace && state.sent_missed.insert(event.id.clone()) {
            batch.missed.push(event.id.clone());
        }
    }

    batch
}

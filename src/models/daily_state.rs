//! Daily state model
//!
//! Per-day tracking sets for one subject: which dose events were taken,
//! which were dismissed, and which alerts were already sent. A day rollover
//! discards the whole structure; the underlying medicine list is untouched.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EventId;

/// Per-day tracking state for one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyState {
    pub date: NaiveDate,
    /// Events marked taken today.
    pub taken: BTreeSet<EventId>,
    /// Events dismissed today; excluded from schedule and adherence counts
    /// for the rest of the day.
    pub deleted: BTreeSet<EventId>,
    /// Reminder keys already sent today (append-only within a day).
    pub sent_reminders: BTreeSet<EventId>,
    /// Missed-dose keys already sent today (append-only within a day).
    pub sent_missed: BTreeSet<EventId>,
}

impl DailyState {
    /// Fresh empty state for a day.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            taken: BTreeSet::new(),
            deleted: BTreeSet::new(),
            sent_reminders: BTreeSet::new(),
            sent_missed: BTreeSet::new(),
        }
    }
}

/// Adherence figures for a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adherence {
    pub taken: usize,
    pub total: usize,
    /// Percentage in [0, 100]; 0 when there are no scheduled doses.
    pub pct: u8,
}

impl Adherence {
    pub fn compute(taken: usize, total: usize) -> Self {
        let pct = if total == 0 {
            0
        } else {
            ((taken * 100) / total).min(100) as u8
        };
        Self { taken, total, pct }
    }
}

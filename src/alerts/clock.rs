//! Clock collaborator
//!
//! Wall-clock time is injected so the tracker and evaluator can be tested
//! deterministically. Day boundaries are local-time.

use std::sync::Mutex;

use chrono::{Local, NaiveDateTime};

/// Wall-clock provider
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// System local time
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Parse "2024-01-01 08:00" style timestamps; panics on bad input,
    /// which is fine for test fixtures.
    pub fn at(timestamp: &str) -> Self {
        Self::new(parse_timestamp(timestamp))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().expect("clock lock") = now;
    }

    pub fn advance_to(&self, timestamp: &str) {
        self.set(parse_timestamp(timestamp));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("clock lock")
    }
}

fn parse_timestamp(timestamp: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M")
        .unwrap_or_else(|e| panic!("bad test timestamp {:?}: {}", timestamp, e))
}

//! Alert scheduler
//!
//! One periodic driver for every subject (the user plus any family members
//! sharing their schedules). Each tick derives the subject's schedule from
//! its prescription source, runs the alert rules under the tracker lock,
//! and hands due notifications to the registered sink. Subjects are
//! independent: one failing cycle is logged and skipped, never carried into
//! the next tick or into other subjects.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::alerts::{AlertConfig, AlertKind, Clock, Notification, NotificationSink};
use crate::models::{Adherence, DoseEvent, EventId, Medicine, Subject};
use crate::store::{KvStore, StoreError};
use crate::tracker::DailyStateTracker;

/// How often the alert rules are re-evaluated.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Prescription source error
#[derive(Debug, Error)]
#[error("Prescription source error: {0}")]
pub struct SourceError(pub String);

/// External provider of a subject's prescribed medicine list
///
/// Read-only per invocation; the scheduler re-reads it every tick so
/// prescription changes show up without restarts.
pub trait PrescriptionSource: Send + Sync {
    fn medicines(&self) -> Result<Vec<Medicine>, SourceError>;
}

/// Fixed in-memory medicine list
pub struct StaticSource {
    medicines: Vec<Medicine>,
}

impl StaticSource {
    pub fn new(medicines: Vec<Medicine>) -> Self {
        Self { medicines }
    }
}

impl PrescriptionSource for StaticSource {
    fn medicines(&self) -> Result<Vec<Medicine>, SourceError> {
        Ok(self.medicines.clone())
    }
}

/// Medicine list read from a JSON file
///
/// Re-read on every access, so editing the file shows up on the next tick
/// without a restart.
pub struct FileSource {
    path: std::path::PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PrescriptionSource for FileSource {
    fn medicines(&self) -> Result<Vec<Medicine>, SourceError> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| SourceError(format!("read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| SourceError(format!("parse {}: {}", self.path.display(), e)))
    }
}

/// What one evaluation cycle produced for one subject
#[derive(Debug, Default)]
pub struct CycleReport {
    pub events: usize,
    pub reminders_sent: usize,
    pub missed_sent: usize,
    pub delivery_failures: usize,
}

/// One subject's schedule: source + tracker + identity
pub struct SubjectSchedule {
    subject: Subject,
    source: Arc<dyn PrescriptionSource>,
    tracker: DailyStateTracker,
    config: AlertConfig,
}

impl SubjectSchedule {
    pub fn new(
        subject: Subject,
        source: Arc<dyn PrescriptionSource>,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        config: AlertConfig,
    ) -> Self {
        let tracker = DailyStateTracker::new(subject.id.clone(), store, clock);
        Self {
            subject,
            source,
            tracker,
            config,
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Today's derived dose events, with dismissed ones filtered out.
    ///
    /// A source failure degrades to an empty schedule; the day's tracking
    /// state is untouched and the next call retries.
    pub fn todays_events(&self) -> Result<Vec<DoseEvent>, StoreError> {
        let medicines = self.source.medicines().unwrap_or_else(|err| {
            warn!(subject = %self.subject.id, %err, "prescription source failed, using empty schedule");
            Vec::new()
        });
        let deleted = self.tracker.state()?.deleted;

        Ok(crate::schedule::derive_schedule(&medicines)
            .into_iter()
            .filter(|event| !deleted.contains(&event.id))
            .collect())
    }

    pub fn mark_taken(&self, event_id: &EventId) -> Result<bool, StoreError> {
        self.tracker.mark_taken(event_id)
    }

    pub fn unmark_taken(&self, event_id: &EventId) -> Result<bool, StoreError> {
        self.tracker.unmark_taken(event_id)
    }

    pub fn delete_event(&self, event_id: &EventId) -> Result<(), StoreError> {
        self.tracker.delete_event(event_id)
    }

    /// Today's adherence figures.
    pub fn adherence(&self) -> Result<Adherence, StoreError> {
        let medicines = self.source.medicines().unwrap_or_default();
        let events = crate::schedule::derive_schedule(&medicines);
        self.tracker.adherence(&events)
    }

    /// Run one evaluation cycle and dispatch the resulting notifications.
    ///
    /// Alert keys are recorded and persisted under the tracker lock before
    /// any delivery attempt, so a slow or failing sink can never cause a
    /// duplicate. Delivery failures are counted and logged, not retried.
    pub fn run_cycle(&self, sink: &dyn NotificationSink) -> Result<CycleReport, StoreError> {
        let medicines = self.source.medicines().unwrap_or_else(|err| {
            warn!(subject = %self.subject.id, %err, "prescription source failed, using empty schedule");
            Vec::new()
        });
        let events = crate::schedule::derive_schedule(&medicines);
        let batch = self.tracker.run_alert_cycle(&events, &self.config)?;

        let mut report = CycleReport {
            events: events.len(),
            ..CycleReport::default()
        };

        for (kind, ids) in [
            (AlertKind::Reminder, &batch.reminders),
            (AlertKind::Missed, &batch.missed),
        ] {
            for id in ids {
                let Some(event) = events.iter().find(|e| &e.id == id) else {
                    continue;
                };
                let notification = self.notification_for(kind, event);
                match sink.deliver(&notification) {
                    Ok(()) => match kind {
                        AlertKind::Reminder => report.reminders_sent += 1,
                        AlertKind::Missed => report.missed_sent += 1,
                    },
                    Err(err) => {
                        // At-most-once attempt: the key is already recorded,
                        // so this alert will not come back next tick.
                        warn!(subject = %self.subject.id, event = %id, %err, "notification delivery failed");
                        report.delivery_failures += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    fn notification_for(&self, kind: AlertKind, event: &DoseEvent) -> Notification {
        Notification {
            kind,
            subject: if self.subject.is_self {
                None
            } else {
                Some(self.subject.display_name.clone())
            },
            medicine_name: event.medicine_name.clone(),
            dosage: event.dosage.clone(),
            scheduled_time: event.scheduled_time,
        }
    }
}

/// Periodic driver over all subjects
pub struct AlertScheduler {
    subjects: Vec<SubjectSchedule>,
    sink: Arc<dyn NotificationSink>,
}

impl AlertScheduler {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            subjects: Vec::new(),
            sink,
        }
    }

    pub fn add_subject(&mut self, schedule: SubjectSchedule) {
        info!(subject = %schedule.subject.id, "subject registered");
        self.subjects.push(schedule);
    }

    pub fn subjects(&self) -> &[SubjectSchedule] {
        &self.subjects
    }

    /// Run one tick across every subject. One subject's failure never
    /// blocks the others; errors are fatal for that cycle only.
    pub fn tick(&self) {
        for schedule in &self.subjects {
            match schedule.run_cycle(self.sink.as_ref()) {
                Ok(report) => {
                    if report.reminders_sent > 0 || report.missed_sent > 0 {
                        info!(
                            subject = %schedule.subject.id,
                            reminders = report.reminders_sent,
                            missed = report.missed_sent,
                            "alerts dispatched"
                        );
                    } else {
                        debug!(subject = %schedule.subject.id, events = report.events, "cycle idle");
                    }
                }
                Err(err) => {
                    warn!(subject = %schedule.subject.id, %err, "evaluation cycle failed, retrying next tick");
                }
            }
        }
    }

    /// Tick forever on the fixed interval. The first tick fires
    /// immediately, matching the evaluate-on-load behavior.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            interval.tick().await;
            self.tick();
        }
    }
}

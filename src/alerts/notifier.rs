//! Notification sink
//!
//! The evaluator decides when an alert fires and what it says; delivery
//! (SMS, push, UI toast) belongs to whatever sink is registered. Delivery
//! is at-most-once attempt: a failed send is reported upward but never
//! re-queued, since the alert key was already recorded.

use chrono::NaiveTime;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Notification delivery error
#[derive(Debug, Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Alert kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Reminder,
    Missed,
}

/// One alert ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: AlertKind,
    /// Display name of the subject, omitted for the user's own schedule.
    pub subject: Option<String>,
    pub medicine_name: String,
    pub dosage: String,
    pub scheduled_time: NaiveTime,
}

impl Notification {
    /// Human-readable message body.
    pub fn message(&self) -> String {
        let whose = match &self.subject {
            Some(name) => format!("{}'s ", name),
            None => "your ".to_string(),
        };
        let time = self.scheduled_time.format("%H:%M");

        match self.kind {
            AlertKind::Reminder => format!(
                "Medicine Reminder: it's almost time to take {}{} ({}) at {}.",
                whose, self.medicine_name, self.dosage, time
            ),
            AlertKind::Missed => format!(
                "Missed Dose Alert: {}{} ({}) scheduled for {} may have been missed. \
                 Take it as soon as possible, unless it's almost time for the next dose.",
                whose, self.medicine_name, self.dosage, time
            ),
        }
    }
}

/// Delivery interface
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Sink that delivers through the log
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            kind = ?notification.kind,
            subject = notification.subject.as_deref().unwrap_or("self"),
            "{}",
            notification.message()
        );
        Ok(())
    }
}

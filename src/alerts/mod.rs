//! Alerting
//!
//! Clock collaborator, per-tick alert evaluation, and the notification
//! sink boundary.

mod clock;
mod evaluator;
mod notifier;

pub use clock::{Clock, ManualClock, SystemClock};
pub use evaluator::{evaluate, AlertBatch, AlertConfig};
pub use notifier::{AlertKind, LogSink, NotificationSink, Notification, NotifyError};

//! Data models
//!
//! Rust structs for medicines, derived dose events and per-day state.

mod daily_state;
mod dose_event;
mod medicine;
mod subject;

pub use daily_state::{Adherence, DailyState};
pub use dose_event::{DoseEvent, EventId};
pub use medicine::{Medicine, TimingSlot, ALL_SLOTS};
pub use subject::Subject;

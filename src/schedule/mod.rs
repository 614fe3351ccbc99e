//! Schedule derivation
//!
//! Turns prescribed medicines into the day's dose events.

mod derive;
mod frequency;

pub use derive::derive_schedule;
pub use frequency::parse_frequency;

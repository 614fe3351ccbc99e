//! Dose event model
//!
//! A dose event is one scheduled administration of a medicine on a given
//! day, derived from the medicine's frequency or explicit timing list.
//! Events are ephemeral and recomputed daily; only their ids are persisted
//! (in the taken/deleted/alert-sent sets).

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::TimingSlot;

/// Stable dose event identity: `"{medicine_id}-{slot_index}"`.
///
/// The same logical dose maps to the same id across recomputation within a
/// day, which is what lets the taken/deleted sets survive re-derivation.
pub type EventId = String;

/// One scheduled dose of a medicine on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseEvent {
    pub id: EventId,
    pub medicine_id: String,
    pub medicine_name: String,
    pub dosage: String,
    pub slot: TimingSlot,
    pub scheduled_time: NaiveTime,
}

impl DoseEvent {
    pub fn new(medicine_id: &str, name: &str, dosage: &str, slot: TimingSlot) -> Self {
        Self {
            id: Self::event_id(medicine_id, slot),
            medicine_id: medicine_id.to_string(),
            medicine_name: name.to_string(),
            dosage: dosage.to_string(),
            slot,
            scheduled_time: slot.scheduled_time(),
        }
    }

    /// Compose the stable id for a (medicine, slot) pair.
    pub fn event_id(medicine_id: &str, slot: TimingSlot) -> EventId {
        format!("{}-{}", medicine_id, slot.sort_order())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_is_stable() {
        let a = DoseEvent::new("med-1", "Amoxicillin", "500mg", TimingSlot::Morning);
        let b = DoseEvent::new("med-1", "Amoxicillin", "500mg", TimingSlot::Morning);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "med-1-0");
    }

    #[test]
    fn test_event_id_differs_per_slot() {
        let morning = DoseEvent::event_id("med-1", TimingSlot::Morning);
        let night = DoseEvent::event_id("med-1", TimingSlot::Night);
        assert_ne!(morning, night);
    }

    #[test]
    fn test_scheduled_time_comes_from_slot_table() {
        let event = DoseEvent::new("med-2", "Metformin", "850mg", TimingSlot::Evening);
        assert_eq!(event.scheduled_time, TimingSlot::Evening.scheduled_time());
    }
}

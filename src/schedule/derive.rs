//! Schedule derivation
//!
//! Converts the prescription list into the day's concrete dose events.
//! Pure function: same input, same output, same ids — re-rendering or
//! re-scheduling mid-day must not move or rename anything.

use std::collections::BTreeSet;

use crate::models::{DoseEvent, Medicine, TimingSlot, ALL_SLOTS};

use super::frequency::parse_frequency;

/// Timing slots for one medicine, deduplicated and in slot order.
///
/// An explicit non-empty timing list on the medicine overrides frequency
/// parsing.
fn slots_for(medicine: &Medicine) -> Vec<TimingSlot> {
    let slots: BTreeSet<TimingSlot> = if medicine.timing.is_empty() {
        parse_frequency(&medicine.frequency).into_iter().collect()
    } else {
        medicine
            .timing
            .iter()
            .map(|label| TimingSlot::from_str(label))
            .collect()
    };

    slots.into_iter().collect()
}

/// Derive today's dose events from the prescription list.
///
/// Output is sorted by slot order (morning < afternoon < evening < night),
/// ties broken by input medicine order. An empty medicine list yields an
/// empty schedule.
pub fn derive_schedule(medicines: &[Medicine]) -> Vec<DoseEvent> {
    let per_medicine: Vec<Vec<TimingSlot>> = medicines.iter().map(slots_for).collect();

    let mut events = Vec::new();
    for slot in ALL_SLOTS {
        for (medicine, slots) in medicines.iter().zip(&per_medicine) {
            if slots.contains(&slot) {
                events.push(DoseEvent::new(
                    &medicine.id,
                    &medicine.name,
                    &medicine.dosage,
                    slot,
                ));
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amoxicillin() -> Medicine {
        Medicine::new("med-1", "Amoxicillin", "500mg", "3x daily")
    }

    #[test]
    fn test_empty_list_yields_empty_schedule() {
        assert!(derive_schedule(&[]).is_empty());
    }

    #[test]
    fn test_three_times_daily_yields_three_events() {
        let events = derive_schedule(&[amoxicillin()]);
        assert_eq!(events.len(), 3);

        let hours: Vec<u32> = events
            .iter()
            .map(|e| chrono::Timelike::hour(&e.scheduled_time))
            .collect();
        assert_eq!(hours, vec![8, 13, 19]);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let medicines = vec![
            amoxicillin(),
            Medicine::new("med-2", "Melatonin", "3mg", "at bedtime"),
        ];
        let first = derive_schedule(&medicines);
        let second = derive_schedule(&medicines);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sorted_by_slot_then_input_order() {
        let medicines = vec![
            Medicine::new("med-1", "Melatonin", "3mg", "at bedtime"),
            Medicine::new("med-2", "Amoxicillin", "500mg", "twice daily"),
            Medicine::new("med-3", "Vitamin D", "1000 IU", "once daily"),
        ];
        let events = derive_schedule(&medicines);

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        // Morning: med-2 then med-3 (input order); evening: med-2; night: med-1.
        assert_eq!(ids, vec!["med-2-0", "med-3-0", "med-2-2", "med-1-3"]);
    }

    #[test]
    fn test_explicit_timing_overrides_frequency() {
        let medicine = Medicine::new("med-1", "Levothyroxine", "50mcg", "twice daily")
            .with_timing(vec!["before_breakfast".to_string()]);
        let events = derive_schedule(&[medicine]);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].slot, TimingSlot::Morning);
    }

    #[test]
    fn test_duplicate_timing_labels_deduplicate() {
        let medicine = Medicine::new("med-1", "Ibuprofen", "200mg", "")
            .with_timing(vec!["morning".to_string(), "after_breakfast".to_string()]);
        let events = derive_schedule(&[medicine]);
        assert_eq!(events.len(), 1);
    }
}

//! Medicine model and timing slots
//!
//! A `Medicine` is one prescribed item as supplied by the external
//! prescription source. The core never mutates it; each scheduling pass
//! reads the list fresh.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Timing slot enum
///
/// The four fixed daily periods doses are bucketed into. The slot order
/// (morning < afternoon < evening < night) is also the schedule sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

/// All slots in schedule order.
pub const ALL_SLOTS: [TimingSlot; 4] = [
    TimingSlot::Morning,
    TimingSlot::Afternoon,
    TimingSlot::Evening,
    TimingSlot::Night,
];

impl TimingSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimingSlot::Morning => "morning",
            TimingSlot::Afternoon => "afternoon",
            TimingSlot::Evening => "evening",
            TimingSlot::Night => "night",
        }
    }

    /// Parse a timing label from an explicit timing list.
    ///
    /// Accepts the extended meal-relative vocabulary prescriptions use and
    /// folds each label into one of the four slots. Unknown labels fall back
    /// to morning rather than dropping the dose.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "morning" | "before_breakfast" | "after_breakfast" | "breakfast" => {
                TimingSlot::Morning
            }
            "afternoon" | "before_lunch" | "after_lunch" | "lunch" | "midday" | "noon" => {
                TimingSlot::Afternoon
            }
            "evening" | "before_dinner" | "after_dinner" | "dinner" => TimingSlot::Evening,
            "night" | "bedtime" => TimingSlot::Night,
            _ => TimingSlot::Morning,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TimingSlot::Morning => "Morning",
            TimingSlot::Afternoon => "Afternoon",
            TimingSlot::Evening => "Evening",
            TimingSlot::Night => "Night",
        }
    }

    /// Sort order for schedule display (morning first)
    pub fn sort_order(&self) -> i32 {
        match self {
            TimingSlot::Morning => 0,
            TimingSlot::Afternoon => 1,
            TimingSlot::Evening => 2,
            TimingSlot::Night => 3,
        }
    }

    /// Canonical time of day for this slot.
    ///
    /// 08:00 / 13:00 / 19:00 / 22:00 is the contract; the schedule deriver
    /// and the alert evaluator both read from this single table.
    pub fn scheduled_time(&self) -> NaiveTime {
        let (hour, minute) = match self {
            TimingSlot::Morning => (8, 0),
            TimingSlot::Afternoon => (13, 0),
            TimingSlot::Evening => (19, 0),
            TimingSlot::Night => (22, 0),
        };
        // The table only contains valid wall-clock times.
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

/// A prescribed medicine record from the external prescription source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    /// Stable identity assigned by the source; dose event ids derive from it.
    pub id: String,
    pub name: String,
    /// Free text, e.g. "500mg"
    pub dosage: String,
    /// Free text describing daily count, e.g. "3x daily", "as needed"
    pub frequency: String,
    /// Optional explicit timing labels; when non-empty this overrides
    /// frequency parsing.
    #[serde(default)]
    pub timing: Vec<String>,
}

impl Medicine {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dosage: dosage.into(),
            frequency: frequency.into(),
            timing: Vec::new(),
        }
    }

    pub fn with_timing(mut self, timing: Vec<String>) -> Self {
        self.timing = timing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_times_match_table() {
        assert_eq!(
            TimingSlot::Morning.scheduled_time(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        );
        assert_eq!(
            TimingSlot::Afternoon.scheduled_time(),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap()
        );
        assert_eq!(
            TimingSlot::Evening.scheduled_time(),
            NaiveTime::from_hms_opt(19, 0, 0).unwrap()
        );
        assert_eq!(
            TimingSlot::Night.scheduled_time(),
            NaiveTime::from_hms_opt(22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_from_str_extended_vocabulary() {
        assert_eq!(TimingSlot::from_str("before_breakfast"), TimingSlot::Morning);
        assert_eq!(TimingSlot::from_str("After_Lunch"), TimingSlot::Afternoon);
        assert_eq!(TimingSlot::from_str("dinner"), TimingSlot::Evening);
        assert_eq!(TimingSlot::from_str("bedtime"), TimingSlot::Night);
    }

    #[test]
    fn test_from_str_unknown_defaults_to_morning() {
        assert_eq!(TimingSlot::from_str("whenever"), TimingSlot::Morning);
        assert_eq!(TimingSlot::from_str(""), TimingSlot::Morning);
    }

    #[test]
    fn test_slot_ordering_follows_day() {
        let mut slots = vec![TimingSlot::Night, TimingSlot::Morning, TimingSlot::Evening];
        slots.sort_by_key(|s| s.sort_order());
        assert_eq!(
            slots,
            vec![TimingSlot::Morning, TimingSlot::Evening, TimingSlot::Night]
        );
    }
}

//! Frequency string parsing
//!
//! Turns the free-text frequency on a prescription ("3x daily", "tid",
//! "take at bedtime", ...) into the set of timing slots a dose should be
//! scheduled into. Matching is case-insensitive substring matching with a
//! fixed priority order; the first group that matches wins.
//!
//! Anything unrecognized, including "as needed", falls back to a single
//! morning slot. That is a deliberate safe default, not an error.

use crate::models::TimingSlot;

/// Keyword groups in priority order. Earlier groups win.
const PATTERNS: &[(&[&str], &[TimingSlot])] = &[
    (
        &["twice", "2 times", "2x", "bid"],
        &[TimingSlot::Morning, TimingSlot::Evening],
    ),
    (
        &["three", "3 times", "3x", "tid"],
        &[TimingSlot::Morning, TimingSlot::Afternoon, TimingSlot::Evening],
    ),
    (
        &["four", "4 times", "4x", "qid"],
        &[
            TimingSlot::Morning,
            TimingSlot::Afternoon,
            TimingSlot::Evening,
            TimingSlot::Night,
        ],
    ),
    (&["night", "bedtime"], &[TimingSlot::Night]),
];

/// Parse a frequency string into timing slots, in slot order.
pub fn parse_frequency(frequency: &str) -> Vec<TimingSlot> {
    let lower = frequency.to_lowercase();

    for (keywords, slots) in PATTERNS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return slots.to_vec();
        }
    }

    vec![TimingSlot::Morning]
}

//! Subject model
//!
//! A subject is whose schedule is being tracked: the user themselves or a
//! family member who shares their schedule. The same scheduling, tracking
//! and alerting rules apply to every subject; only the notification text
//! differs (family alerts carry the subject's name).

use serde::{Deserialize, Serialize};

/// Whose schedule a tracker/evaluator pair operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Stable id used in persistence keys; must not contain ':'.
    pub id: String,
    pub display_name: String,
    /// True for the user's own schedule; alerts for self omit the name.
    pub is_self: bool,
}

impl Subject {
    pub fn new_self(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_self: true,
        }
    }

    pub fn family_member(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_self: false,
        }
    }
}

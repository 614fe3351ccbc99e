//! Persistence collaborator
//!
//! The tracker persists its per-day sets through a narrow key-value
//! abstraction with synchronous get/set semantics. Keys follow the
//! `"{subject_id}:{date}:{field}"` scheme; values are versioned JSON
//! envelopes validated on read. A value that fails to parse is treated as
//! absent — the single recovery path is "start the day empty", never a
//! crash.

mod memory;
mod sqlite;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::EventId;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Synchronous key-value persistence
///
/// Implementations only need string get/set; the envelope format and the
/// key scheme are owned by this module.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Envelope schema version for persisted id sets.
const ENVELOPE_VERSION: u32 = 1;

/// Versioned wire form of one persisted id set
#[derive(Debug, Serialize, Deserialize)]
struct SetEnvelope {
    v: u32,
    ids: BTreeSet<EventId>,
}

/// Compose a storage key.
pub fn state_key(subject_id: &str, date: &str, field: &str) -> String {
    format!("{}:{}:{}", subject_id, date, field)
}

/// Read one id set, degrading malformed or wrong-version data to empty.
pub fn load_id_set(store: &dyn KvStore, key: &str) -> StoreResult<BTreeSet<EventId>> {
    let Some(raw) = store.get(key)? else {
        return Ok(BTreeSet::new());
    };

    match serde_json::from_str::<SetEnvelope>(&raw) {
        Ok(envelope) if envelope.v == ENVELOPE_VERSION => Ok(envelope.ids),
        Ok(envelope) => {
            warn!(key, version = envelope.v, "unknown envelope version, resetting");
            Ok(BTreeSet::new())
        }
        Err(err) => {
            warn!(key, %err, "malformed persisted state, resetting");
            Ok(BTreeSet::new())
        }
    }
}

/// Write one id set in the current envelope format.
pub fn save_id_set(store: &dyn KvStore, key: &str, ids: &BTreeSet<EventId>) -> StoreResult<()> {
    let envelope = SetEnvelope {
        v: ENVELOPE_VERSION,
        ids: ids.clone(),
    };
    let raw = serde_json::to_string(&envelope)
        .map_err(|e| StoreError::Backend(format!("serialize envelope: {}", e)))?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key_scheme() {
        assert_eq!(state_key("alice", "2024-01-01", "taken"), "alice:2024-01-01:taken");
    }

    #[test]
    fn test_roundtrip_id_set() {
        let store = MemoryStore::new();
        let mut ids = BTreeSet::new();
        ids.insert("med-1-0".to_string());
        ids.insert("med-2-3".to_string());

        save_id_set(&store, "alice:2024-01-01:taken", &ids).unwrap();
        let loaded = load_id_set(&store, "alice:2024-01-01:taken").unwrap();
        assert_eq!(loaded, ids);
    }

    #[test]
    fn test_missing_key_is_empty() {
        let store = MemoryStore::new();
        assert!(load_id_set(&store, "nobody:2024-01-01:taken").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_value_degrades_to_empty() {
        let store = MemoryStore::new();
        store.set("alice:2024-01-01:taken", "{not json").unwrap();
        assert!(load_id_set(&store, "alice:2024-01-01:taken").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_version_degrades_to_empty() {
        let store = MemoryStore::new();
        store
            .set("alice:2024-01-01:taken", r#"{"v":99,"ids":["med-1-0"]}"#)
            .unwrap();
        assert!(load_id_set(&store, "alice:2024-01-01:taken").unwrap().is_empty());
    }
}

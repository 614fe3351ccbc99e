//! SQLite store
//!
//! `KvStore` backed by the pooled SQLite database. One row per key; writes
//! are upserts so repeated persistence of the same day's state stays cheap.

use rusqlite::params;

use crate::db::Database;

use super::{KvStore, StoreError, StoreResult};

/// SQLite-backed key-value store
#[derive(Clone)]
pub struct SqliteStore {
    database: Database,
}

impl SqliteStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self
            .database
            .get_conn()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let result = conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self
            .database
            .get_conn()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![key, value],
        )
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;

    fn test_store() -> SqliteStore {
        let database = Database::in_memory().unwrap();
        database
            .with_conn(|conn| migrations::run_migrations(conn))
            .unwrap();
        SqliteStore::new(database)
    }

    #[test]
    fn test_get_missing_key() {
        let store = test_store();
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let store = test_store();
        store.set("alice:2024-01-01:taken", r#"{"v":1,"ids":[]}"#).unwrap();
        assert_eq!(
            store.get("alice:2024-01-01:taken").unwrap().as_deref(),
            Some(r#"{"v":1,"ids":[]}"#)
        );
    }

    #[test]
    fn test_set_overwrites() {
        let store = test_store();
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
    }
}

//! Progress Store - persistent key/value storage for session state
//!
//! Challenge progress and query history are kept as JSON documents under
//! fixed keys in a small SQLite file, so they survive between runs.

use crate::error::{PracticeError, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Key holding the completed-challenge map
pub const PROGRESS_KEY: &str = "challengeProgress";

/// Key holding the query history list
pub const HISTORY_KEY: &str = "queryHistory";

const DB_FILE: &str = "progress.db";

pub struct ProgressStore {
    path: Option<PathBuf>,
    db: Connection,
}

impl ProgressStore {
    /// Open or create `progress.db` inside `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let db_path = dir.join(DB_FILE);
        let db = Connection::open(&db_path)
            .map_err(|e| PracticeError::Storage(format!("Failed to open database: {}", e)))?;

        let store = Self {
            path: Some(db_path),
            db,
        };
        store.init_schema()?;
        info!("Opened progress store at {}", dir.display());
        Ok(store)
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()
            .map_err(|e| PracticeError::Storage(format!("Failed to open database: {}", e)))?;
        let store = Self { path: None, db };
        store.init_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(&self) -> Result<()> {
        self.db
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS kv_store (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
                "#,
                [],
            )
            .map_err(|e| PracticeError::Storage(format!("Failed to create table: {}", e)))?;
        Ok(())
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.db
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| PracticeError::Storage(format!("Failed to read '{}': {}", key, e)))
    }

    pub fn put_raw(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .execute(
                r#"
                INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| PracticeError::Storage(format!("Failed to write '{}': {}", key, e)))?;
        debug!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.db
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(|e| PracticeError::Storage(format!("Failed to remove '{}': {}", key, e)))?;
        Ok(())
    }

    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.put_raw(key, &serde_json::to_string(value)?)
    }

    /// Read a JSON document. An unreadable document is logged and treated
    /// as missing so a corrupt entry never blocks the session.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Failed to parse saved {}: {}", key, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_round_trip_and_overwrite() {
        let store = ProgressStore::in_memory().unwrap();
        assert!(store.get_raw(PROGRESS_KEY).unwrap().is_none());

        let mut progress = BTreeMap::new();
        progress.insert("1".to_string(), true);
        store.put_json(PROGRESS_KEY, &progress).unwrap();
        progress.insert("2".to_string(), true);
        store.put_json(PROGRESS_KEY, &progress).unwrap();

        let loaded: BTreeMap<String, bool> = store.get_json(PROGRESS_KEY).unwrap().unwrap();
        assert_eq!(loaded.len(), 2);

        store.remove(PROGRESS_KEY).unwrap();
        assert!(store.get_raw(PROGRESS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_document_reads_as_missing() {
        let store = ProgressStore::in_memory().unwrap();
        store.put_raw(HISTORY_KEY, "{not json").unwrap();
        let loaded: Option<Vec<String>> = store.get_json(HISTORY_KEY).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = ProgressStore::open(dir.path()).unwrap();
            store.put_raw(PROGRESS_KEY, "{\"3\":true}").unwrap();
        }
        let store = ProgressStore::open(dir.path()).unwrap();
        assert_eq!(store.get_raw(PROGRESS_KEY).unwrap().as_deref(), Some("{\"3\":true}"));
        assert!(store.path().unwrap().ends_with("progress.db"));
    }
}

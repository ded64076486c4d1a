//! SQLite persistence for named SSID sets, so notifier blocklists survive
//! restarts.
//!
//! One row per `(set_key, ssid)`. A key with no rows loads as an empty set.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::debug;

use wifinotify_core::{BlocklistStore, StoreError};

/// SQLite-backed store of named string-sets.
pub struct SqliteSetStore {
    conn: Connection,
}

impl SqliteSetStore {
    /// Open (or create) a database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(StoreError::backend)?;
        let store = Self { conn };
        store.migrate()?;
        debug!(path = %path.display(), "set store opened");
        Ok(store)
    }

    /// Open an in-memory database. Useful for testing.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::backend)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS ssid_sets (
                    set_key    TEXT NOT NULL,
                    ssid       TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (set_key, ssid)
                );",
            )
            .map_err(StoreError::backend)
    }

    /// Keys that currently hold at least one SSID, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT set_key FROM ssid_sets ORDER BY set_key")
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(StoreError::backend)?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(StoreError::backend)?);
        }
        Ok(keys)
    }

    pub fn load_set(&self, key: &str) -> Result<BTreeSet<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT ssid FROM ssid_sets WHERE set_key = ?1")
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .map_err(StoreError::backend)?;

        let mut set = BTreeSet::new();
        for row in rows {
            set.insert(row.map_err(StoreError::backend)?);
        }
        Ok(set)
    }

    /// Replace every SSID under `key` with `ssids`, atomically.
    pub fn replace_set(&mut self, key: &str, ssids: &BTreeSet<String>) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction().map_err(StoreError::backend)?;
        tx.execute("DELETE FROM ssid_sets WHERE set_key = ?1", params![key])
            .map_err(StoreError::backend)?;
        {
            let mut insert = tx
                .prepare("INSERT INTO ssid_sets (set_key, ssid, updated_at) VALUES (?1, ?2, ?3)")
                .map_err(StoreError::backend)?;
            for ssid in ssids {
                insert
                    .execute(params![key, ssid, now])
                    .map_err(StoreError::backend)?;
            }
        }
        tx.commit().map_err(StoreError::backend)?;
        debug!(key, count = ssids.len(), "set saved");
        Ok(())
    }

    /// Delete one SSID from `key`. Returns `false` if it was not stored.
    pub fn remove_member(&mut self, key: &str, ssid: &str) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM ssid_sets WHERE set_key = ?1 AND ssid = ?2",
                params![key, ssid],
            )
            .map_err(StoreError::backend)?;
        Ok(removed > 0)
    }

    /// Delete every SSID under `key`. Returns how many were removed.
    pub fn clear_set(&mut self, key: &str) -> Result<usize, StoreError> {
        self.conn
            .execute("DELETE FROM ssid_sets WHERE set_key = ?1", params![key])
            .map_err(StoreError::backend)
    }
}

impl BlocklistStore for SqliteSetStore {
    fn load(&self, key: &str) -> Result<BTreeSet<String>, StoreError> {
        self.load_set(key)
    }

    fn save(&mut self, key: &str, ssids: &BTreeSet<String>) -> Result<(), StoreError> {
        self.replace_set(key, ssids)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn open_in_memory_creates_table() {
        let store = SqliteSetStore::open_in_memory().expect("should open in-memory db");
        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM ssid_sets", [], |row| row.get(0))
            .expect("ssid_sets table should exist");
        assert_eq!(count, 0);
    }

    #[test]
    fn unknown_key_loads_empty() {
        let store = SqliteSetStore::open_in_memory().unwrap();
        assert!(store.load("never-saved").unwrap().is_empty());
    }

    #[test]
    fn save_replaces_previous_contents() {
        let mut store = SqliteSetStore::open_in_memory().unwrap();
        store.save("k", &set(&["A", "B"])).unwrap();
        store.save("k", &set(&["B", "C"])).unwrap();

        assert_eq!(store.load("k").unwrap(), set(&["B", "C"]));
    }

    #[test]
    fn keys_are_independent() {
        let mut store = SqliteSetStore::open_in_memory().unwrap();
        store.save("open", &set(&["A"])).unwrap();
        store.save("carrier", &set(&["B"])).unwrap();
        store.save("open", &set(&[])).unwrap();

        assert!(store.load("open").unwrap().is_empty());
        assert_eq!(store.load("carrier").unwrap(), set(&["B"]));
        assert_eq!(store.keys().unwrap(), vec!["carrier".to_string()]);
    }

    #[test]
    fn remove_member_reports_presence() {
        let mut store = SqliteSetStore::open_in_memory().unwrap();
        store.save("k", &set(&["A", "B"])).unwrap();

        assert!(store.remove_member("k", "A").unwrap());
        assert!(!store.remove_member("k", "A").unwrap());
        assert_eq!(store.load("k").unwrap(), set(&["B"]));
    }

    #[test]
    fn clear_set_counts_rows() {
        let mut store = SqliteSetStore::open_in_memory().unwrap();
        store.save("k", &set(&["A", "B", "C"])).unwrap();
        store.save("other", &set(&["Z"])).unwrap();

        assert_eq!(store.clear_set("k").unwrap(), 3);
        assert_eq!(store.clear_set("k").unwrap(), 0);
        assert_eq!(store.load("other").unwrap(), set(&["Z"]));
    }
}

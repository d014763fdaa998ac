//! SQLite-based store implementation

use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{KvStore, StoreError, StoreResult};

/// SQLite-based key-value store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn()?;

        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        let updated_at = questline_util::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, updated_at],
        )?;

        debug!(key = %key, "Value stored");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, String)>> {
        let conn = self.conn()?;

        // substr() instead of LIKE so '_' and '%' in keys match literally
        let mut stmt = conn.prepare(
            "SELECT key, value FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;

        let rows = stmt.query_map([prefix], |row| {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            Ok((key, value))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }

        Ok(entries)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_get_set_remove() {
        let store = SqliteStore::in_memory().unwrap();

        assert_eq!(store.get("missing").unwrap(), None);

        store.set("sound_enabled", "true").unwrap();
        assert_eq!(store.get("sound_enabled").unwrap().as_deref(), Some("true"));

        store.set("sound_enabled", "false").unwrap();
        assert_eq!(store.get("sound_enabled").unwrap().as_deref(), Some("false"));

        store.remove("sound_enabled").unwrap();
        assert_eq!(store.get("sound_enabled").unwrap(), None);

        // Removing again is fine
        store.remove("sound_enabled").unwrap();
    }

    #[test]
    fn test_scan_prefix_is_literal() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("daily_challenge_quiz_2025-1-2", "20").unwrap();
        store.set("daily_challenge_quiz_2025-1-1", "10").unwrap();
        store.set("dailyXchallenge_quiz_2025-1-1", "99").unwrap();
        store.set("highscore_quiz", "30").unwrap();

        let entries = store.scan_prefix("daily_challenge_quiz_").unwrap();
        assert_eq!(
            entries,
            vec![
                ("daily_challenge_quiz_2025-1-1".to_string(), "10".to_string()),
                ("daily_challenge_quiz_2025-1-2".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questline.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("daily_challenge_quiz-1_2025-12-25", "150").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("daily_challenge_quiz-1_2025-12-25").unwrap().as_deref(),
            Some("150")
        );
    }
}

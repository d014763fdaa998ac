//! Store wrapper that degrades to process memory
//!
//! When the primary store refuses a read or write, the operation is served
//! from an in-process map instead. Values written during an outage survive
//! for the lifetime of the process but never reach durable storage.
//!
//! The in-process map only holds keys whose last write failed, so it always
//! wins over the primary. A later successful write or remove drops the key
//! from the map again.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::{KvStore, StoreError, StoreResult};

pub struct FallbackStore {
    primary: Arc<dyn KvStore>,
    memory: Mutex<BTreeMap<String, String>>,
    degraded: AtomicBool,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn KvStore>) -> Self {
        Self {
            primary,
            memory: Mutex::new(BTreeMap::new()),
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether any operation has fallen back to memory
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    fn memory(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.memory
            .lock()
            .map_err(|_| StoreError::Unavailable("fallback lock poisoned".into()))
    }

    fn mark_degraded(&self, op: &str, key: &str, error: &StoreError) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            warn!(op, key = %key, error = %error, "Primary store failed, using memory fallback");
        }
    }
}

impl KvStore for FallbackStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if let Some(value) = self.memory()?.get(key) {
            return Ok(Some(value.clone()));
        }

        match self.primary.get(key) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.mark_degraded("get", key, &e);
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        match self.primary.set(key, value) {
            Ok(()) => {
                self.memory()?.remove(key);
            }
            Err(e) => {
                self.mark_degraded("set", key, &e);
                self.memory()?.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        if let Err(e) = self.primary.remove(key) {
            self.mark_degraded("remove", key, &e);
        }
        self.memory()?.remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, String)>> {
        let mut merged: BTreeMap<String, String> = match self.primary.scan_prefix(prefix) {
            Ok(entries) => entries.into_iter().collect(),
            Err(e) => {
                self.mark_degraded("scan_prefix", prefix, &e);
                BTreeMap::new()
            }
        };

        for (k, v) in self.memory()?.iter() {
            if k.starts_with(prefix) {
                merged.insert(k.clone(), v.clone());
            }
        }

        Ok(merged.into_iter().collect())
    }

    fn is_healthy(&self) -> bool {
        self.primary.is_healthy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn passes_through_when_primary_is_healthy() {
        let primary = Arc::new(MemoryStore::new());
        let store = FallbackStore::new(primary.clone());

        store.set("beta_access", "true").unwrap();

        assert_eq!(primary.get("beta_access").unwrap().as_deref(), Some("true"));
        assert!(!store.is_degraded());
    }

    #[test]
    fn failed_write_lands_in_memory() {
        let primary = Arc::new(MemoryStore::new());
        primary.set_fail_writes(true);
        let store = FallbackStore::new(primary.clone());

        store.set("commander_name", "Ada").unwrap();

        assert!(store.is_degraded());
        assert!(primary.is_empty());
        assert_eq!(store.get("commander_name").unwrap().as_deref(), Some("Ada"));
    }

    #[test]
    fn failed_read_is_served_from_memory() {
        let primary = Arc::new(MemoryStore::new());
        primary.set("durable", "1").unwrap();
        primary.set_fail_writes(true);
        let store = FallbackStore::new(primary.clone());
        store.set("volatile", "2").unwrap();

        primary.set_fail_reads(true);

        assert_eq!(store.get("volatile").unwrap().as_deref(), Some("2"));
        // Durable data is unreachable while the primary is down
        assert_eq!(store.get("durable").unwrap(), None);
    }

    #[test]
    fn scan_merges_primary_and_memory() {
        let primary = Arc::new(MemoryStore::new());
        primary.set("highscore_a", "10").unwrap();
        let store = FallbackStore::new(primary.clone());

        primary.set_fail_writes(true);
        store.set("highscore_b", "20").unwrap();

        let entries = store.scan_prefix("highscore_").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], ("highscore_b".to_string(), "20".to_string()));
    }

    #[test]
    fn failed_overwrite_shadows_primary_value() {
        let primary = Arc::new(MemoryStore::new());
        primary.set("highscore_quiz", "10").unwrap();
        let store = FallbackStore::new(primary.clone());

        primary.set_fail_writes(true);
        store.set("highscore_quiz", "20").unwrap();

        assert_eq!(store.get("highscore_quiz").unwrap().as_deref(), Some("20"));
        assert_eq!(
            store.scan_prefix("highscore_").unwrap(),
            vec![("highscore_quiz".to_string(), "20".to_string())]
        );
        assert_eq!(primary.get("highscore_quiz").unwrap().as_deref(), Some("10"));

        // Once the primary recovers, the next write goes through and the
        // memory copy is dropped
        primary.set_fail_writes(false);
        store.set("highscore_quiz", "30").unwrap();
        primary.set("highscore_quiz", "35").unwrap();
        assert_eq!(store.get("highscore_quiz").unwrap().as_deref(), Some("35"));
    }

    #[test]
    fn remove_clears_memory_copy() {
        let primary = Arc::new(MemoryStore::new());
        primary.set_fail_writes(true);
        let store = FallbackStore::new(primary.clone());
        store.set("token", "abc").unwrap();

        store.remove("token").unwrap();

        assert_eq!(store.get("token").unwrap(), None);
    }
}

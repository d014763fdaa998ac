//! In-memory store with failure injection

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::{KvStore, StoreError, StoreResult};

/// Volatile key-value store.
///
/// Used for `--memory` runs and as the test double for durable backends.
/// Reads and writes can be switched to fail, simulating quota exhaustion
/// or disabled storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure reads to fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Configure writes (set and remove) to fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored keys, ignoring injected failures
    pub fn len(&self) -> usize {
        self.entries().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all keys, ignoring injected failures
    pub fn keys(&self) -> Vec<String> {
        self.entries()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn entries(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("quota exceeded".into()));
        }
        Ok(())
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_read()?;
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_write()?;
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_write()?;
        self.entries()?.remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, String)>> {
        self.check_read()?;
        Ok(self
            .entries()?
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn is_healthy(&self) -> bool {
        !self.fail_reads.load(Ordering::SeqCst) && !self.fail_writes.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_scan() {
        let store = MemoryStore::new();
        store.set("b", "2").unwrap();
        store.set("a_1", "1").unwrap();
        store.set("a_2", "3").unwrap();

        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 3);

        let scanned = store.scan_prefix("a_").unwrap();
        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[0].0, "a_1");
    }

    #[test]
    fn test_injected_failures() {
        let store = MemoryStore::new();
        store.set("key", "value").unwrap();

        store.set_fail_reads(true);
        assert!(matches!(store.get("key"), Err(StoreError::Unavailable(_))));
        assert!(!store.is_healthy());

        store.set_fail_reads(false);
        store.set_fail_writes(true);
        assert!(store.set("other", "x").is_err());
        assert!(store.remove("key").is_err());

        // Failed writes leave contents untouched
        assert_eq!(store.keys(), vec!["key".to_string()]);
    }
}

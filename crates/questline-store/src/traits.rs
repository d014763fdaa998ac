//! Store trait definitions

use crate::StoreResult;

/// Durable string key-value store.
///
/// Only single-key writes are atomic; there are no transactions.
pub trait KvStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or replace a value
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a key; deleting an absent key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// All entries whose key starts with `prefix`, ordered by key
    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, String)>>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

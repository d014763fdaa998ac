//! Persistence layer for questline
//!
//! Provides:
//! - The `KvStore` trait: string keys to string values, single-key writes
//! - SQLite and in-memory backends
//! - A fallback wrapper that degrades to process memory
//! - Typed accessors (numbers, flags, JSON, high scores)

mod fallback;
mod keys;
mod memory;
mod sqlite;
mod traits;
mod typed;

pub use fallback::*;
pub use keys::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
pub use typed::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

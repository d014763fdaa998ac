//! Shared utilities for questline
//!
//! This crate provides:
//! - ID types (ActivityId, DayKey)
//! - Time utilities (injectable clocks, reset countdown)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;

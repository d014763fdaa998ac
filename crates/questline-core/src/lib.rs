//! Daily challenge state machine and game progress tracking for questline
//!
//! This crate contains:
//! - The daily challenge tracker (NotStarted -> Active -> Completed, per activity per day)
//! - Score multiplier and reset countdown
//! - XP, collected cards, operations and rank progression

mod daily;
mod progress;

pub use daily::*;
pub use progress::*;

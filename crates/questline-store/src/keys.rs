//! Storage key layout
//!
//! Every persisted value lives under a flat string key. Daily challenge
//! records embed the day so each (activity, day) pair owns exactly one key.

use questline_util::{ActivityId, DayKey};

/// Prefix shared by all daily challenge records
pub const DAILY_CHALLENGE_PREFIX: &str = "daily_challenge_";

/// Prefix for per-activity best scores
pub const HIGH_SCORE_PREFIX: &str = "highscore_";

/// Key holding the serialized game progress
pub const PROGRESS_KEY: &str = "game_progress";

/// `daily_challenge_<activity>_<day>`
pub fn daily_challenge_key(activity: &ActivityId, day: &DayKey) -> String {
    format!("{}{}_{}", DAILY_CHALLENGE_PREFIX, activity, day)
}

/// Prefix matching every daily record of one activity
pub fn daily_challenge_activity_prefix(activity: &ActivityId) -> String {
    format!("{}{}_", DAILY_CHALLENGE_PREFIX, activity)
}

/// `highscore_<activity>`
pub fn high_score_key(activity: &ActivityId) -> String {
    format!("{}{}", HIGH_SCORE_PREFIX, activity)
}

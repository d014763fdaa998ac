//! Daily challenge state machine
//!
//! One bonus run per activity per local calendar day. The tracker keeps the
//! "active" flag in memory only; the sole persisted fact is the completion
//! record `daily_challenge_<activity>_<day>` holding the final score.
//!
//! Storage failures never surface to the caller:
//! - a failed read at construction is treated as "not completed" (fail-open)
//! - a failed write on completion is dropped; the in-memory state still says
//!   completed for the rest of the process, but a fresh tracker will not see it

use questline_config::DEFAULT_BONUS_MULTIPLIER;
use questline_store::{KvStore, daily_challenge_key};
use questline_util::{ActivityId, Clock, DayKey, hours_until_reset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-activity, per-day challenge state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeState {
    NotStarted,
    Active,
    Completed,
}

/// Outcome of a completed challenge
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Storage key the score was written under
    pub key: String,
    pub score: f64,
    /// False when the write failed and the result only lives in memory
    pub persisted: bool,
}

/// Snapshot of a tracker for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatus {
    pub activity_id: ActivityId,
    pub today_key: DayKey,
    pub state: ChallengeState,
    pub score_multiplier: u32,
    pub hours_until_reset: u32,
}

/// Daily challenge tracker for one activity
pub struct DailyChallenge {
    activity_id: ActivityId,
    today_key: DayKey,
    storage_key: String,
    store: Arc<dyn KvStore>,
    bonus_multiplier: u32,
    is_daily_active: bool,
    has_completed_today: bool,
    hours_until_reset: u32,
}

impl DailyChallenge {
    /// Create a tracker with the default 2x bonus
    pub fn new(activity_id: ActivityId, store: Arc<dyn KvStore>, clock: &dyn Clock) -> Self {
        Self::with_multiplier(activity_id, store, clock, DEFAULT_BONUS_MULTIPLIER)
    }

    /// Create a tracker, reading today's completion record from `store`.
    ///
    /// The day key and reset countdown are taken from `clock` once and do not
    /// follow the clock afterwards.
    pub fn with_multiplier(
        activity_id: ActivityId,
        store: Arc<dyn KvStore>,
        clock: &dyn Clock,
        bonus_multiplier: u32,
    ) -> Self {
        let now = clock.now();
        let today_key = DayKey::from_date(now.date_naive());
        let storage_key = daily_challenge_key(&activity_id, &today_key);

        let has_completed_today = match store.get(&storage_key) {
            Ok(record) => record.is_some(),
            Err(e) => {
                // Fail open: let the player have their bonus
                warn!(
                    activity = %activity_id,
                    key = %storage_key,
                    error = %e,
                    "Could not read daily challenge record, assuming not completed"
                );
                false
            }
        };

        debug!(
            activity = %activity_id,
            day = %today_key,
            completed = has_completed_today,
            "Daily challenge loaded"
        );

        Self {
            activity_id,
            today_key,
            storage_key,
            store,
            bonus_multiplier,
            is_daily_active: false,
            has_completed_today,
            hours_until_reset: hours_until_reset(&now),
        }
    }

    /// Begin today's challenge. No-op if it was already completed.
    ///
    /// Returns whether the challenge is now active because of this call.
    pub fn start(&mut self) -> bool {
        if self.has_completed_today || self.is_daily_active {
            return false;
        }

        self.is_daily_active = true;
        info!(activity = %self.activity_id, day = %self.today_key, "Daily challenge started");
        true
    }

    /// Finish the running challenge with `score`. No-op if none is running.
    pub fn complete(&mut self, score: f64) -> Option<Completion> {
        if !self.is_daily_active {
            return None;
        }

        self.is_daily_active = false;
        self.has_completed_today = true;

        let persisted = match self.store.set(&self.storage_key, &score.to_string()) {
            Ok(()) => true,
            Err(e) => {
                // Fail silent: the session still counts as completed
                warn!(
                    activity = %self.activity_id,
                    key = %self.storage_key,
                    error = %e,
                    "Could not persist daily challenge result"
                );
                false
            }
        };

        info!(
            activity = %self.activity_id,
            day = %self.today_key,
            score,
            persisted,
            "Daily challenge completed"
        );

        Some(Completion {
            key: self.storage_key.clone(),
            score,
            persisted,
        })
    }

    pub fn state(&self) -> ChallengeState {
        if self.has_completed_today {
            ChallengeState::Completed
        } else if self.is_daily_active {
            ChallengeState::Active
        } else {
            ChallengeState::NotStarted
        }
    }

    pub fn is_daily_active(&self) -> bool {
        self.is_daily_active
    }

    pub fn has_completed_today(&self) -> bool {
        self.has_completed_today
    }

    /// Bonus multiplier while active, 1 otherwise
    pub fn score_multiplier(&self) -> u32 {
        if self.is_daily_active {
            self.bonus_multiplier
        } else {
            1
        }
    }

    /// Whole hours until local midnight, as of construction
    pub fn hours_until_reset(&self) -> u32 {
        self.hours_until_reset
    }

    pub fn today_key(&self) -> &DayKey {
        &self.today_key
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn status(&self) -> DailyStatus {
        DailyStatus {
            activity_id: self.activity_id.clone(),
            today_key: self.today_key.clone(),
            state: self.state(),
            score_multiplier: self.score_multiplier(),
            hours_until_reset: self.hours_until_reset,
        }
    }
}

//! Typed accessors over a raw key-value store
//!
//! Values are stored as strings. Reads that hit a corrupted value drop the key
//! and return the caller's default, so a bad write can never wedge a feature.
//! Failures are logged once per key to keep logs readable when storage is
//! down for a whole session.

use questline_util::{ActivityId, DayKey};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::{
    KvStore, daily_challenge_activity_prefix, daily_challenge_key, high_score_key,
};

/// A stored daily challenge result
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub day: DayKey,
    pub score: String,
}

pub struct TypedStore {
    inner: Arc<dyn KvStore>,
    logged_keys: Mutex<HashSet<String>>,
}

impl TypedStore {
    pub fn new(inner: Arc<dyn KvStore>) -> Self {
        Self {
            inner,
            logged_keys: Mutex::new(HashSet::new()),
        }
    }

    fn log_once(&self, key: &str, message: &str, detail: &dyn std::fmt::Display) {
        let first = self
            .logged_keys
            .lock()
            .map(|mut keys| keys.insert(key.to_string()))
            .unwrap_or(true);
        if first {
            warn!(key = %key, detail = %detail, "{}", message);
        }
    }

    // Primitives

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.inner.get(key) {
            Ok(value) => value,
            Err(e) => {
                self.log_once(key, "Failed to read", &e);
                None
            }
        }
    }

    pub fn set_string(&self, key: &str, value: &str) -> bool {
        match self.inner.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                self.log_once(key, "Failed to write", &e);
                false
            }
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_string(key) {
            Some(value) => value == "true",
            None => default,
        }
    }

    pub fn set_bool(&self, key: &str, value: bool) -> bool {
        self.set_string(key, if value { "true" } else { "false" })
    }

    /// Read a number, dropping the key if it does not parse
    pub fn get_number(&self, key: &str, default: f64) -> f64 {
        let Some(raw) = self.get_string(key) else {
            return default;
        };
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => {
                self.log_once(key, "Invalid number value, resetting to default", &raw);
                self.remove(key);
                default
            }
        }
    }

    /// Store a number; NaN and infinities are refused
    pub fn set_number(&self, key: &str, value: f64) -> bool {
        if !value.is_finite() {
            self.log_once(key, "Refusing to store non-finite number", &value);
            return false;
        }
        self.set_string(key, &value.to_string())
    }

    /// Read and decode JSON, dropping the key if it is corrupt or rejected by `validator`
    pub fn get_json<T, F>(&self, key: &str, validator: F) -> Option<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&T) -> bool,
    {
        let raw = self.get_string(key)?;
        match serde_json::from_str::<T>(&raw) {
            Ok(value) if validator(&value) => Some(value),
            Ok(_) => {
                self.log_once(key, "Validation failed, resetting to default", &"invalid structure");
                self.remove(key);
                None
            }
            Err(e) => {
                self.log_once(key, "Failed to parse JSON, resetting to default", &e);
                self.remove(key);
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.set_string(key, &json),
            Err(e) => {
                self.log_once(key, "Failed to serialize JSON", &e);
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.inner.remove(key) {
            Ok(()) => true,
            Err(e) => {
                self.log_once(key, "Failed to remove", &e);
                false
            }
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.get_string(key).is_some()
    }

    // High scores

    pub fn high_score(&self, activity: &ActivityId) -> f64 {
        self.get_number(&high_score_key(activity), 0.0)
    }

    /// Store `score` if it beats the current best; returns whether it did
    pub fn record_high_score(&self, activity: &ActivityId, score: f64) -> bool {
        if score > self.high_score(activity) {
            return self.set_number(&high_score_key(activity), score);
        }
        false
    }

    // Daily challenge records

    pub fn daily_completion(&self, activity: &ActivityId, day: &DayKey) -> Option<String> {
        self.get_string(&daily_challenge_key(activity, day))
    }

    /// Every stored daily result for one activity, oldest first
    pub fn daily_history(&self, activity: &ActivityId) -> Vec<DailyRecord> {
        let prefix = daily_challenge_activity_prefix(activity);
        let entries = match self.inner.scan_prefix(&prefix) {
            Ok(entries) => entries,
            Err(e) => {
                self.log_once(&prefix, "Failed to scan", &e);
                return Vec::new();
            }
        };

        let mut records: Vec<(chrono::NaiveDate, DailyRecord)> = entries
            .into_iter()
            .filter_map(|(key, score)| {
                // Skip other activities sharing the prefix ("quiz" vs "quiz_2")
                let day = DayKey::parse(&key[prefix.len()..])?;
                let date = day.to_date()?;
                Some((date, DailyRecord { day, score }))
            })
            .collect();

        records.sort_by_key(|(date, _)| *date);
        records.into_iter().map(|(_, record)| record).collect()
    }
}

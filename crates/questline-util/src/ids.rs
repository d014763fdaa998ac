//! Strongly-typed identifiers for questline

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{QuestlineError, Result};

/// Identifier of a game or quest instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(String);

impl ActivityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse user input into an ID, rejecting empty or whitespace-bearing values
    pub fn parse(id: &str) -> Result<Self> {
        if id.is_empty() {
            return Err(QuestlineError::validation("activity id cannot be empty"));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(QuestlineError::validation(format!(
                "activity id '{}' cannot contain whitespace",
                id
            )));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ActivityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ActivityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Calendar-day key derived from a local date.
///
/// Formatted as `year-month-day` without zero padding (`2025-1-5`), so two
/// instants share a key exactly when they fall on the same local day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayKey(String);

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{}-{}-{}", date.year(), date.month(), date.day()))
    }

    /// Parse a stored key, accepting only the canonical unpadded spelling
    pub fn parse(s: &str) -> Option<Self> {
        let key = Self(s.to_string());
        let date = key.to_date()?;
        (Self::from_date(date) == key).then_some(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the calendar date, if the key is well formed
    pub fn to_date(&self) -> Option<NaiveDate> {
        let mut parts = self.0.splitn(3, '-');
        let year = parts.next()?.parse().ok()?;
        let month = parts.next()?.parse().ok()?;
        let day = parts.next()?.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_id_equality() {
        let id1 = ActivityId::new("quiz-1");
        let id2 = ActivityId::new("quiz-1");
        let id3 = ActivityId::new("quiz-2");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn activity_id_parse_rejects_bad_input() {
        assert!(ActivityId::parse("").is_err());
        assert!(ActivityId::parse("deep work").is_err());
        assert_eq!(ActivityId::parse("deepwork").unwrap().as_str(), "deepwork");
    }

    #[test]
    fn day_key_is_not_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(DayKey::from_date(date).as_str(), "2025-1-5");

        let date = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        assert_eq!(DayKey::from_date(date).as_str(), "2025-12-25");
    }

    #[test]
    fn day_key_round_trips_to_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(DayKey::from_date(date).to_date(), Some(date));
        assert_eq!(DayKey("garbage".into()).to_date(), None);
    }

    #[test]
    fn day_key_parse_is_canonical() {
        assert_eq!(DayKey::parse("2025-3-7").unwrap().as_str(), "2025-3-7");
        assert!(DayKey::parse("2025-03-07").is_none());
        assert!(DayKey::parse("2025-2-30").is_none());
        assert!(DayKey::parse("2_2025-3-7").is_none());
    }

    #[test]
    fn ids_serialize_deserialize() {
        let activity = ActivityId::new("calendar");
        let json = serde_json::to_string(&activity).unwrap();
        assert_eq!(json, "\"calendar\"");
        let parsed: ActivityId = serde_json::from_str(&json).unwrap();
        assert_eq!(activity, parsed);
    }
}

//! Configuration validation

use crate::schema::{RawActivity, RawConfig};
use questline_util::ActivityId;
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Activity '{activity_id}': {message}")]
    ActivityError {
        activity_id: String,
        message: String,
    },

    #[error("Duplicate activity ID: {0}")]
    DuplicateActivityId(String),

    #[error("Invalid bonus multiplier {0}: must be at least 1")]
    InvalidMultiplier(u32),
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen_ids = HashSet::new();
    for activity in &config.activities {
        if !seen_ids.insert(&activity.id) {
            errors.push(ValidationError::DuplicateActivityId(activity.id.clone()));
        }
    }

    for activity in &config.activities {
        errors.extend(validate_activity(activity));
    }

    if let Some(multiplier) = config.challenge.bonus_multiplier
        && multiplier < 1
    {
        errors.push(ValidationError::InvalidMultiplier(multiplier));
    }

    errors
}

fn validate_activity(activity: &RawActivity) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Err(e) = ActivityId::parse(&activity.id) {
        errors.push(ValidationError::ActivityError {
            activity_id: activity.id.clone(),
            message: e.to_string(),
        });
    }

    if activity.label.trim().is_empty() {
        errors.push(ValidationError::ActivityError {
            activity_id: activity.id.clone(),
            message: "label cannot be empty".into(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawChallengeConfig, RawStorageConfig};

    fn config_with(activities: Vec<RawActivity>, multiplier: Option<u32>) -> RawConfig {
        RawConfig {
            config_version: 1,
            storage: RawStorageConfig::default(),
            challenge: RawChallengeConfig {
                bonus_multiplier: multiplier,
            },
            activities,
        }
    }

    fn activity(id: &str, label: &str) -> RawActivity {
        RawActivity {
            id: id.into(),
            label: label.into(),
        }
    }

    #[test]
    fn valid_config_has_no_errors() {
        let config = config_with(vec![activity("quiz-1", "Quiz")], Some(2));
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let config = config_with(
            vec![activity("quiz-1", "Quiz"), activity("quiz-1", "Quiz again")],
            None,
        );
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ValidationError::DuplicateActivityId(id) if id == "quiz-1"));
    }

    #[test]
    fn bad_activities_are_reported() {
        let config = config_with(vec![activity("", "Empty"), activity("deep work", " ")], None);
        let errors = validate_config(&config);
        // empty id, whitespace id, blank label
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn zero_multiplier_is_rejected() {
        let config = config_with(vec![], Some(0));
        let errors = validate_config(&config);
        assert!(matches!(errors[0], ValidationError::InvalidMultiplier(0)));
    }
}

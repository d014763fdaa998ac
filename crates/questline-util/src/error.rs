//! Error types for questline

use thiserror::Error;

use crate::ActivityId;

/// Core error type for questline operations
#[derive(Debug, Error)]
pub enum QuestlineError {
    #[error("Unknown activity: {0}")]
    UnknownActivity(ActivityId),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl QuestlineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, QuestlineError>;

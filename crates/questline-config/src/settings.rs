//! Validated settings

use crate::schema::{RawActivity, RawChallengeConfig, RawConfig, RawStorageBackend, RawStorageConfig};
use questline_util::{ActivityId, default_data_dir};
use std::path::PathBuf;

/// Score multiplier used when the config does not set one
pub const DEFAULT_BONUS_MULTIPLIER: u32 = 2;

/// Validated settings ready for use
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub storage: StorageConfig,
    pub challenge: ChallengeRules,
    pub activities: Vec<Activity>,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            storage: StorageConfig::from_raw(raw.storage),
            challenge: ChallengeRules::from_raw(raw.challenge),
            activities: raw.activities.into_iter().map(Activity::from_raw).collect(),
        }
    }

    /// Get activity by ID
    pub fn get_activity(&self, id: &ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|a| &a.id == id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::from_raw(RawStorageConfig::default())
    }
}

impl StorageConfig {
    fn from_raw(raw: RawStorageConfig) -> Self {
        let backend = match raw.backend {
            Some(RawStorageBackend::Memory) => StorageBackend::Memory,
            Some(RawStorageBackend::Sqlite) | None => StorageBackend::Sqlite,
        };

        Self {
            backend,
            data_dir: raw.data_dir.unwrap_or_else(default_data_dir),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeRules {
    pub bonus_multiplier: u32,
}

impl Default for ChallengeRules {
    fn default() -> Self {
        Self {
            bonus_multiplier: DEFAULT_BONUS_MULTIPLIER,
        }
    }
}

impl ChallengeRules {
    fn from_raw(raw: RawChallengeConfig) -> Self {
        Self {
            bonus_multiplier: raw.bonus_multiplier.unwrap_or(DEFAULT_BONUS_MULTIPLIER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: ActivityId,
    pub label: String,
}

impl Activity {
    fn from_raw(raw: RawActivity) -> Self {
        Self {
            id: ActivityId::new(raw.id),
            label: raw.label,
        }
    }
}

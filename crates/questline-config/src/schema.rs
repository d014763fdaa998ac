//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Where progress is kept
    #[serde(default)]
    pub storage: RawStorageConfig,

    /// Daily challenge rules
    #[serde(default)]
    pub challenge: RawChallengeConfig,

    /// Known activities
    #[serde(default)]
    pub activities: Vec<RawActivity>,
}

/// Storage settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStorageConfig {
    /// "sqlite" (default) or "memory"
    pub backend: Option<RawStorageBackend>,

    /// Directory holding the database
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RawStorageBackend {
    Sqlite,
    Memory,
}

/// Challenge settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawChallengeConfig {
    /// Score multiplier while a daily challenge is active
    pub bonus_multiplier: Option<u32>,
}

/// Raw activity definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawActivity {
    /// Unique stable ID, used in storage keys
    pub id: String,

    /// Display label
    pub label: String,
}

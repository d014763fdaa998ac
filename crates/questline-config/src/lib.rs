//! Configuration parsing and validation for questline
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Storage backend selection
//! - Daily challenge rules
//! - Activity definitions
//! - Validation with clear error messages

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration, falling back to defaults if the file does not exist
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Settings::default());
    }
    load_config(path)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Settings::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1
        "#;

        let settings = parse_config(config).unwrap();
        assert!(settings.activities.is_empty());
        assert_eq!(settings.challenge.bonus_multiplier, 2);
        assert_eq!(settings.storage.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn parse_full_config() {
        let config = r#"
            config_version = 1

            [storage]
            backend = "memory"
            data_dir = "/var/lib/questline"

            [challenge]
            bonus_multiplier = 3

            [[activities]]
            id = "quiz-1"
            label = "Chapter 1 Quiz"

            [[activities]]
            id = "deepwork"
            label = "Deep Work Dive"
        "#;

        let settings = parse_config(config).unwrap();
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.storage.data_dir.to_str(), Some("/var/lib/questline"));
        assert_eq!(settings.challenge.bonus_multiplier, 3);
        assert_eq!(settings.activities.len(), 2);
        assert_eq!(settings.activities[1].id.as_str(), "deepwork");
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_unknown_backend() {
        let config = r#"
            config_version = 1

            [storage]
            backend = "redis"
        "#;

        assert!(matches!(parse_config(config), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "config_version = 1\n[[activities]]\nid = \"clicker\"\nlabel = \"Captain Click\"\n",
        )
        .unwrap();

        let settings = load_config(&path).unwrap();
        assert_eq!(settings.activities[0].label, "Captain Click");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_config_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.challenge.bonus_multiplier, 2);

        assert!(matches!(
            load_config(dir.path().join("absent.toml")),
            Err(ConfigError::ReadError(_))
        ));
    }
}

//! Failures while reading, writing, or checking the pendant config file.

use std::io;
use thiserror::Error;

/// Anything that can go wrong between a config file on disk and a [`crate::Config`]
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read config: {0}")]
    LoadError(String),

    #[error("Cannot write config: {0}")]
    SaveError(String),

    /// No platform config directory, or it could not be created.
    #[error("No usable config directory: {0}")]
    ConfigDirectory(String),

    #[error("Config file I/O failed: {0}")]
    IoError(#[from] io::Error),

    #[error("Malformed JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed TOML config: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Cannot encode config as TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The file parsed but its values are unusable.
    #[error("Rejected config: {0}")]
    Config(#[from] ConfigError),
}

/// A parsed config whose contents fail validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// File extension is neither `.toml` nor `.json`.
    #[error("Config files must be .toml or .json, got '{0}'")]
    UnsupportedFormat(String),

    #[error("'{key}' is out of range: {value}")]
    ValueOutOfRange { key: String, value: String },

    #[error("'{key}' is invalid: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    pub(crate) fn out_of_range(key: &str, value: impl ToString) -> Self {
        ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_key() {
        assert_eq!(
            ConfigError::out_of_range("jog.step", 20.0).to_string(),
            "'jog.step' is out of range: 20"
        );
        assert_eq!(
            ConfigError::invalid("jog.default_axis", "unknown axis 'joint9'").to_string(),
            "'jog.default_axis' is invalid: unknown axis 'joint9'"
        );
    }

    #[test]
    fn test_validation_error_wraps() {
        let err: SettingsError = ConfigError::UnsupportedFormat("yaml".to_string()).into();
        assert!(matches!(err, SettingsError::Config(ConfigError::UnsupportedFormat(_))));
        assert_eq!(
            err.to_string(),
            "Rejected config: Config files must be .toml or .json, got 'yaml'"
        );
    }

    #[test]
    fn test_io_error_wraps() {
        let err: SettingsError = io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into();
        assert!(matches!(err, SettingsError::IoError(_)));
        assert_eq!(err.to_string(), "Config file I/O failed: read-only");
    }
}

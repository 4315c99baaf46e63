//! Configuration for the virtual pendant
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files; the default location is the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Server settings (backend URL, request timeout, robot number)
//! - Jog defaults (mode, axis, step, repeat interval)
//! - Robot state polling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use vpendant_core::{AxisInfo, JogMode, StepSize};

const APP_DIR: &str = "vpendant";
const CONFIG_FILE: &str = "config.toml";

/// Pendant backend connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the pendant API
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Robot number sent with axis selection
    pub robot: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8082".to_string(),
            timeout_ms: 5000,
            robot: 1,
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Initial jog selection and repeat rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JogSettings {
    pub default_mode: JogMode,
    pub default_axis: String,
    pub step: f64,
    /// Milliseconds between repeated jog requests while held
    pub repeat_interval_ms: u64,
}

impl Default for JogSettings {
    fn default() -> Self {
        Self {
            default_mode: JogMode::Joint,
            default_axis: "joint1".to_string(),
            step: 1.0,
            repeat_interval_ms: 30,
        }
    }
}

impl JogSettings {
    pub fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.repeat_interval_ms)
    }
}

/// Robot state polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub enabled: bool,
    pub interval_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 125,
        }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// File format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Complete pendant configuration
///
/// Aggregates all settings sections and provides file I/O operations.
/// Missing sections and keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub jog: JogSettings,
    pub polling: PollingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config_dir>/vpendant/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("No config directory on this platform".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        // Server
        let url = self.server.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "server.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.server.timeout_ms == 0 {
            return Err(ConfigError::out_of_range("server.timeout_ms", 0));
        }
        if self.server.robot == 0 {
            return Err(ConfigError::out_of_range("server.robot", 0));
        }

        // Jog
        if StepSize::new(self.jog.step).is_err() {
            return Err(ConfigError::out_of_range("jog.step", self.jog.step));
        }
        if let Err(err) = AxisInfo::lookup(self.jog.default_mode, &self.jog.default_axis) {
            return Err(ConfigError::invalid("jog.default_axis", err.to_string()));
        }
        if self.jog.repeat_interval_ms == 0 {
            return Err(ConfigError::out_of_range("jog.repeat_interval_ms", 0));
        }

        if self.polling.interval_ms == 0 {
            return Err(ConfigError::out_of_range("polling.interval_ms", 0));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.base_url, "http://localhost:8082");
        assert_eq!(config.jog.repeat_interval(), Duration::from_millis(30));
        assert_eq!(config.polling.interval(), Duration::from_millis(125));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::new();
        config.jog.step = 12.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::out_of_range("jog.step", 12.0))
        );

        let mut config = Config::new();
        config.jog.default_mode = JogMode::World;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "jog.default_axis"
        ));

        let mut config = Config::new();
        config.server.base_url = "localhost:8082".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.server.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.polling.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [jog]
            default_mode = "tool"
            default_axis = "rz"
            "#,
        )
        .unwrap();
        assert_eq!(config.jog.default_mode, JogMode::Tool);
        assert_eq!(config.jog.default_axis, "rz");
        assert_eq!(config.jog.step, 1.0);
        assert_eq!(config.server, ServerSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_format_by_extension() {
        assert_eq!(Format::of(Path::new("a/b.toml")), Ok(Format::Toml));
        assert_eq!(Format::of(Path::new("b.JSON")), Ok(Format::Json));
        assert!(Format::of(Path::new("b.yaml")).is_err());
        assert!(Format::of(Path::new("config")).is_err());
    }

    #[test]
    fn test_default_path_file_name() {
        if let Ok(path) = Config::default_path() {
            assert!(path.ends_with("vpendant/config.toml"));
        }
    }
}

//! vpendant Settings Crate
//!
//! Handles pendant configuration: file formats, defaults, and validation.

pub mod config;
pub mod error;

pub use config::{Config, JogSettings, PollingSettings, ServerSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

//! Configuration parsing and validation for mrfoods
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Storage backend and data directory
//! - Order completion timing and sweep interval
//! - Password storage mode
//! - An optional menu that replaces the bundled default
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

/// Minutes after which a pending order is completed
pub const DEFAULT_COMPLETION_MINUTES: u64 = 15;

/// Longest accepted completion time: one week
pub const MAX_COMPLETION_MINUTES: u64 = 7 * 24 * 60;

/// Seconds between promotion sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Upper bound on the sweep interval: sweeps run at least once per minute
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 60;

/// Currency symbol used when the config does not set one
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// The bundled menu, in the same `[[menu]]` layout the config file accepts
pub const DEFAULT_MENU_TOML: &str = include_str!("../default-menu.toml");

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration if the file exists, otherwise fall back to defaults
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        default_settings()
    }
}

/// Settings with every option at its default and the bundled menu
pub fn default_settings() -> ConfigResult<Settings> {
    parse_config(&format!("config_version = {CURRENT_CONFIG_VERSION}"))
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;

    // Check version
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    // Validate
    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    let default_menu = if raw.menu.is_some() {
        Vec::new()
    } else {
        load_default_menu()?
    };

    Ok(Settings::from_raw(raw, default_menu))
}

fn load_default_menu() -> ConfigResult<Vec<RawMenuCategory>> {
    let file: RawMenuFile = toml::from_str(DEFAULT_MENU_TOML)?;
    let errors = validate_menu(&file.menu);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }
    Ok(file.menu)
}

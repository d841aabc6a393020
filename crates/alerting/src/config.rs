//! Alert defaults configuration

use crate::error::AlertError;
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix (`ALERT_TIMEOUT_MS`, `ALERT_TOAST`, `ALERT_POSITION`)
pub const ENV_PREFIX: &str = "ALERT";

/// Defaults applied to alerts that leave a field unset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Auto-expiry in milliseconds (0 = never expire)
    pub timeout_ms: u64,
    /// Render as a floating toast
    pub toast: bool,
    /// Position token understood by the rendering layer
    pub position: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            toast: false,
            position: "top right".to_string(),
        }
    }
}

impl AlertConfig {
    /// Load defaults from an optional TOML file, overridden by `ALERT_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AlertError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse defaults from TOML text. Missing keys keep their default.
    pub fn from_toml_str(text: &str) -> Result<Self, AlertError> {
        let settings = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Config for alerts that stay until closed
    pub fn sticky() -> Self {
        Self {
            timeout_ms: 0,
            ..Default::default()
        }
    }
}

//! Alerting Error Types

use thiserror::Error;

/// Errors raised by the configuration and logging surfaces.
///
/// Alert operations themselves are total and never return these.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Configuration could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Text did not name a known alert type
    #[error("Unknown alert type: {0}")]
    UnknownType(String),

    /// A global tracing subscriber is already installed
    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}

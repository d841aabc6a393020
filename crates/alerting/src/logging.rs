//! Logging setup

use crate::error::AlertError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global tracing subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(level: Level, format: LogFormat) -> Result<(), AlertError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };

    result.map_err(|e| AlertError::Logging(e.to_string()))
}

//! Alerting System
//!
//! Transient, auto-expiring user notifications: an id-ordered alert manager
//! with sanitized messages, per-alert close, and HTTP error translation.

mod alert;
mod config;
mod container;
mod error;
mod http_error;
mod logging;
mod manager;
mod sanitizer;

pub use alert::{Alert, AlertSpec, AlertType};
pub use crate::config::{AlertConfig, ENV_PREFIX};
pub use container::AlertContainer;
pub use error::AlertError;
pub use http_error::{AppEvent, ErrorAlerts, HttpErrorResponse};
pub use logging::{init_logging, LogFormat};
pub use manager::AlertManager;
pub use sanitizer::{HtmlSanitizer, Sanitizer, SecurityContext};

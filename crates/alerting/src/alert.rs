//! Alert records and partial alert specs

use crate::container::{AlertContainer, WeakContainer};
use crate::error::AlertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Success,
    Danger,
    Warning,
    Info,
}

impl AlertType {
    /// Lowercase name used by the rendering layer
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Success => "success",
            AlertType::Danger => "danger",
            AlertType::Warning => "warning",
            AlertType::Info => "info",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(AlertType::Success),
            "danger" => Ok(AlertType::Danger),
            "warning" => Ok(AlertType::Warning),
            "info" => Ok(AlertType::Info),
            _ => Err(AlertError::UnknownType(s.to_string())),
        }
    }
}

/// What a caller asks for: an alert without an id.
///
/// Unset fields are filled from the manager's defaults when the alert is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSpec {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "timeout")]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub toast: Option<bool>,
    #[serde(default)]
    pub position: Option<String>,
}

impl AlertSpec {
    /// Spec of the given type with every other field unset
    pub fn new(alert_type: AlertType) -> Self {
        Self {
            alert_type,
            message: None,
            timeout_ms: None,
            toast: None,
            position: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(AlertType::Success).message(message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(AlertType::Danger).message(message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(AlertType::Warning).message(message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(AlertType::Info).message(message)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Expiry in milliseconds; 0 keeps the alert until closed
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn toast(mut self, toast: bool) -> Self {
        self.toast = Some(toast);
        self
    }

    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

/// A live notification.
///
/// Immutable once created. It remembers the container it was inserted into,
/// so [`Alert::close`] removes it from wherever it lives.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    id: u64,
    #[serde(rename = "type")]
    alert_type: AlertType,
    message: String,
    #[serde(rename = "timeout")]
    timeout_ms: u64,
    toast: bool,
    position: String,
    #[serde(skip)]
    home: WeakContainer,
}

impl Alert {
    pub(crate) fn new(
        id: u64,
        alert_type: AlertType,
        message: String,
        timeout_ms: u64,
        toast: bool,
        position: String,
        home: &AlertContainer,
    ) -> Self {
        Self {
            id,
            alert_type,
            message,
            timeout_ms,
            toast,
            position,
            home: home.downgrade(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn alert_type(&self) -> AlertType {
        self.alert_type
    }

    /// Sanitized message text
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Expiry delay, `None` if the alert never expires
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn toast(&self) -> bool {
        self.toast
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    /// Remove this alert from the container it was added to.
    ///
    /// Returns `false` if it was already gone or the container was dropped.
    pub fn close(&self) -> bool {
        match self.home.upgrade() {
            Some(container) => self.close_in(&container),
            None => false,
        }
    }

    /// Remove this alert (by id) from `container`. No-op if absent.
    pub fn close_in(&self, container: &AlertContainer) -> bool {
        let removed = container.remove(self.id).is_some();
        if removed {
            tracing::debug!(alert_id = self.id, "Alert closed");
        }
        removed
    }
}

impl PartialEq for Alert {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.alert_type == other.alert_type
            && self.message == other.message
            && self.timeout_ms == other.timeout_ms
            && self.toast == other.toast
            && self.position == other.position
    }
}

impl Eq for Alert {}

//! Alert Manager Implementation

use crate::alert::{Alert, AlertSpec};
use crate::config::AlertConfig;
use crate::container::AlertContainer;
use crate::sanitizer::{HtmlSanitizer, Sanitizer, SecurityContext};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Alert manager owning the id sequence, the defaults and the internal alert list
pub struct AlertManager {
    /// Next id to hand out
    next_id: AtomicU64,
    /// Defaults for unset spec fields, read at add time
    defaults: RwLock<AlertConfig>,
    /// Internal alert list
    alerts: AlertContainer,
    /// Message sanitizer
    sanitizer: Arc<dyn Sanitizer>,
}

impl AlertManager {
    /// Create a new alert manager with the default HTML sanitizer
    pub fn new(config: AlertConfig) -> Self {
        Self::with_sanitizer(config, Arc::new(HtmlSanitizer::new()))
    }

    /// Create a new alert manager with a custom sanitizer
    pub fn with_sanitizer(config: AlertConfig, sanitizer: Arc<dyn Sanitizer>) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            next_id: AtomicU64::new(0),
            defaults: RwLock::new(config),
            alerts: AlertContainer::new(),
            sanitizer,
        }
    }

    /// Build an alert from `spec` and append it to `target`, or to the
    /// internal list when no target is given.
    ///
    /// A positive timeout schedules one removal of the alert from the same
    /// container; removal of an already-closed alert is a no-op.
    pub fn add_alert(&self, spec: AlertSpec, target: Option<&AlertContainer>) -> Alert {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let container = target.unwrap_or(&self.alerts);

        let message = spec
            .message
            .as_deref()
            .and_then(|raw| self.sanitizer.sanitize(SecurityContext::Html, raw))
            .unwrap_or_default();

        let alert = {
            let defaults = self.defaults.read().unwrap_or_else(PoisonError::into_inner);
            Alert::new(
                id,
                spec.alert_type,
                message,
                spec.timeout_ms.unwrap_or(defaults.timeout_ms),
                spec.toast.unwrap_or(defaults.toast),
                spec.position.unwrap_or_else(|| defaults.position.clone()),
                container,
            )
        };

        container.push(alert.clone());
        debug!(
            alert_id = id,
            alert_type = %alert.alert_type(),
            external = target.is_some(),
            "Alert added"
        );

        if let Some(timeout) = alert.timeout() {
            self.schedule_expiry(id, timeout, container);
        }

        alert
    }

    fn schedule_expiry(&self, id: u64, timeout: Duration, container: &AlertContainer) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(alert_id = id, "No async runtime available, alert will not auto-expire");
                return;
            }
        };

        let deadline = tokio::time::Instant::now() + timeout;
        let target = container.downgrade();
        handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(container) = target.upgrade() {
                if container.remove(id).is_some() {
                    debug!(alert_id = id, "Alert expired");
                }
            }
        });
    }

    /// Live handle to the internal alert list (shared, not a copy)
    pub fn get(&self) -> AlertContainer {
        self.alerts.clone()
    }

    /// Remove every alert from the internal list.
    ///
    /// External containers and pending expiry timers are left alone.
    pub fn clear(&self) {
        debug!("Clearing {} alerts", self.alerts.len());
        self.alerts.clear();
    }

    /// Current defaults
    pub fn defaults(&self) -> AlertConfig {
        self.defaults.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace all defaults at once
    pub fn set_defaults(&self, config: AlertConfig) {
        *self.defaults.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Default expiry for alerts added from now on
    pub fn set_default_timeout_ms(&self, timeout_ms: u64) {
        self.defaults.write().unwrap_or_else(PoisonError::into_inner).timeout_ms = timeout_ms;
    }

    /// Default toast flag for alerts added from now on
    pub fn set_default_toast(&self, toast: bool) {
        self.defaults.write().unwrap_or_else(PoisonError::into_inner).toast = toast;
    }

    /// Default position for alerts added from now on
    pub fn set_default_position(&self, position: impl Into<String>) {
        self.defaults.write().unwrap_or_else(PoisonError::into_inner).position = position.into();
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

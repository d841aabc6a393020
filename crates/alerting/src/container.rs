//! Shared ordered alert list

use crate::alert::Alert;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Ordered, shared list of live alerts (oldest first).
///
/// Cloning yields another handle to the same list, not a copy. The manager's
/// internal list and caller-owned external lists are both containers.
#[derive(Debug, Clone, Default)]
pub struct AlertContainer {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

/// Non-owning handle held by alerts and expiry timers
#[derive(Debug, Clone, Default)]
pub(crate) struct WeakContainer {
    alerts: Weak<Mutex<Vec<Alert>>>,
}

impl WeakContainer {
    pub(crate) fn upgrade(&self) -> Option<AlertContainer> {
        self.alerts.upgrade().map(|alerts| AlertContainer { alerts })
    }
}

impl AlertContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Alert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            alerts: Arc::downgrade(&self.alerts),
        }
    }

    pub(crate) fn push(&self, alert: Alert) {
        self.lock().push(alert);
    }

    /// Number of live alerts
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no alerts are live
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current alerts in insertion order
    pub fn snapshot(&self) -> Vec<Alert> {
        self.lock().clone()
    }

    /// Ids of the current alerts in insertion order
    pub fn ids(&self) -> Vec<u64> {
        self.lock().iter().map(Alert::id).collect()
    }

    /// Look up a live alert by id
    pub fn get(&self, id: u64) -> Option<Alert> {
        self.lock().iter().find(|alert| alert.id() == id).cloned()
    }

    /// Check if an alert with this id is live
    pub fn contains(&self, id: u64) -> bool {
        self.lock().iter().any(|alert| alert.id() == id)
    }

    /// Remove the first alert with this id, keeping the others in order.
    ///
    /// Returns `None` when the id is absent.
    pub fn remove(&self, id: u64) -> Option<Alert> {
        let mut alerts = self.lock();
        let index = alerts.iter().position(|alert| alert.id() == id)?;
        Some(alerts.remove(index))
    }

    /// Remove every alert
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Run `f` with exclusive access to the underlying list.
    ///
    /// Must not call back into this container (e.g. `Alert::close`) from `f`.
    pub fn with_alerts<R>(&self, f: impl FnOnce(&mut Vec<Alert>) -> R) -> R {
        f(&mut self.lock())
    }

    /// Check if both handles refer to the same list
    pub fn same_as(&self, other: &AlertContainer) -> bool {
        Arc::ptr_eq(&self.alerts, &other.alerts)
    }
}

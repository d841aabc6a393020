//! HTTP error to alert translation
//!
//! Turns failed backend responses and application error events into
//! `danger` alerts kept in a dedicated external container.

use crate::alert::{Alert, AlertSpec};
use crate::container::AlertContainer;
use crate::manager::AlertManager;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Validation messages reported to the user as a size problem
const SIZE_CONSTRAINTS: &[&str] = &["Min", "Max", "DecimalMin", "DecimalMax"];

/// A failed HTTP exchange as seen by the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpErrorResponse {
    /// Status code (0 when the server could not be reached)
    pub status: u16,
    /// Response headers in arrival order
    pub headers: Vec<(String, String)>,
    /// Raw response body
    pub body: String,
}

impl HttpErrorResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Last header whose lowercase name ends with `suffix`
    fn header_ending_with(&self, suffix: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(name, _)| name.to_ascii_lowercase().ends_with(suffix))
            .map(|(_, value)| value.as_str())
    }

    fn problem(&self) -> Option<ProblemBody> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Error body in problem-details form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemBody {
    message: Option<String>,
    detail: Option<String>,
    #[serde(default)]
    field_errors: Vec<FieldError>,
}

impl ProblemBody {
    fn summary(&self) -> Option<String> {
        let message = self.message.as_ref()?;
        Some(self.detail.clone().unwrap_or_else(|| message.clone()))
    }
}

/// A single bean-validation failure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldError {
    #[serde(default)]
    object_name: String,
    field: String,
    #[serde(default)]
    message: String,
}

/// Events that produce error alerts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A backend call failed
    HttpError(HttpErrorResponse),
    /// Free-form application error
    Error(String),
}

/// Collects error alerts in its own container
pub struct ErrorAlerts {
    manager: Arc<AlertManager>,
    alerts: AlertContainer,
}

impl ErrorAlerts {
    pub fn new(manager: Arc<AlertManager>) -> Self {
        Self {
            manager,
            alerts: AlertContainer::new(),
        }
    }

    /// Live handle to the error alerts
    pub fn alerts(&self) -> AlertContainer {
        self.alerts.clone()
    }

    /// Close one of the error alerts
    pub fn close(&self, alert: &Alert) -> bool {
        alert.close_in(&self.alerts)
    }

    /// Translate one event into alerts and return them
    pub fn handle(&self, event: &AppEvent) -> Vec<Alert> {
        match event {
            AppEvent::HttpError(response) => self.handle_http_error(response),
            AppEvent::Error(message) => vec![self.add_error(message)],
        }
    }

    fn handle_http_error(&self, response: &HttpErrorResponse) -> Vec<Alert> {
        debug!(status = response.status, "Translating HTTP error into alerts");
        match response.status {
            0 => vec![self.add_error("Server not reachable")],
            400 => self.handle_bad_request(response),
            404 => vec![self.add_error("Not found")],
            _ => {
                let message = response
                    .problem()
                    .and_then(|problem| problem.summary())
                    .unwrap_or_else(|| response.body.clone());
                vec![self.add_error(&message)]
            }
        }
    }

    fn handle_bad_request(&self, response: &HttpErrorResponse) -> Vec<Alert> {
        if let Some(error_key) = response.header_ending_with("app-error") {
            if let Some(entity) = response.header_ending_with("app-params") {
                debug!(entity, "Bad request for entity");
            }
            return vec![self.add_error(error_key)];
        }

        let problem = response.problem();
        match problem {
            Some(problem) if !problem.field_errors.is_empty() => problem
                .field_errors
                .iter()
                .map(|field_error| self.add_field_error(field_error))
                .collect(),
            Some(problem) if problem.message.is_some() => {
                let message = problem.summary().unwrap_or_default();
                vec![self.add_error(&message)]
            }
            _ => vec![self.add_error(&response.body)],
        }
    }

    fn add_field_error(&self, field_error: &FieldError) -> Alert {
        let constraint = if SIZE_CONSTRAINTS.contains(&field_error.message.as_str()) {
            "Size"
        } else {
            field_error.message.as_str()
        };
        let field_name = display_field_name(&field_error.field);
        debug!(
            object = %field_error.object_name,
            field = %field_name,
            constraint,
            "Field validation failed"
        );
        self.add_error(&format!("Error on field \"{}\"", field_name))
    }

    fn add_error(&self, message: &str) -> Alert {
        self.manager
            .add_alert(AlertSpec::danger(message), Some(&self.alerts))
    }

    /// Listen for events until every sender is dropped
    pub fn spawn(self: Arc<Self>, mut events: broadcast::Receiver<AppEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Error alert listener started");
            loop {
                match events.recv().await {
                    Ok(event) => {
                        self.handle(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Error alert listener lagged, {} events dropped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            info!("Error alert listener stopped");
        })
    }
}

/// `items[0].dealerName` -> `Items[].dealerName`
fn display_field_name(field: &str) -> String {
    let mut converted = String::with_capacity(field.len());
    let mut chars = field.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '[' {
            let mut digits = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() {
                    digits.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            if chars.peek() == Some(&']') {
                chars.next();
                converted.push_str("[]");
            } else {
                converted.push('[');
                converted.push_str(&digits);
            }
        } else {
            converted.push(c);
        }
    }

    let mut chars = converted.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => converted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertType;
    use crate::config::AlertConfig;
    use std::time::Duration;

    fn error_alerts() -> ErrorAlerts {
        ErrorAlerts::new(Arc::new(AlertManager::new(AlertConfig::sticky())))
    }

    fn messages(alerts: &ErrorAlerts) -> Vec<String> {
        alerts
            .alerts()
            .snapshot()
            .iter()
            .map(|alert| alert.message().to_string())
            .collect()
    }

    #[test]
    fn test_field_name_conversion() {
        assert_eq!(display_field_name("items[0].dealerName"), "Items[].dealerName");
        assert_eq!(display_field_name("periods[12][3]"), "Periods[][]");
        assert_eq!(display_field_name("name[x]"), "Name[x]");
        assert_eq!(display_field_name(""), "");
    }

    #[test]
    fn test_server_unreachable() {
        let alerts = error_alerts();
        let added = alerts.handle(&AppEvent::HttpError(HttpErrorResponse::new(0)));

        assert_eq!(added.len(), 1);
        assert_eq!(added[0].alert_type(), AlertType::Danger);
        assert_eq!(messages(&alerts), vec!["Server not reachable"]);
    }

    #[test]
    fn test_not_found() {
        let alerts = error_alerts();
        alerts.handle(&AppEvent::HttpError(HttpErrorResponse::new(404).body("{}")));
        assert_eq!(messages(&alerts), vec!["Not found"]);
    }

    #[test]
    fn test_bad_request_header() {
        let alerts = error_alerts();
        let response = HttpErrorResponse::new(400)
            .header("X-moneyMarketBiApp-error", "error.idexists")
            .header("X-moneyMarketBiApp-params", "dealer")
            .body(r#"{"message":"ignored"}"#);

        alerts.handle(&AppEvent::HttpError(response));
        assert_eq!(messages(&alerts), vec!["error.idexists"]);
    }

    #[test]
    fn test_bad_request_field_errors() {
        let alerts = error_alerts();
        let body = r#"{
            "message": "error.validation",
            "fieldErrors": [
                {"objectName": "dealer", "field": "name", "message": "NotNull"},
                {"objectName": "dealer", "field": "limits[2].amount", "message": "DecimalMin"}
            ]
        }"#;

        let added = alerts.handle(&AppEvent::HttpError(HttpErrorResponse::new(400).body(body)));

        assert_eq!(added.len(), 2);
        assert_eq!(
            messages(&alerts),
            vec![
                "Error on field \"Name\"".to_string(),
                "Error on field \"Limits[].amount\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_bad_request_problem_detail() {
        let alerts = error_alerts();
        alerts.handle(&AppEvent::HttpError(
            HttpErrorResponse::new(400).body(r#"{"message":"error.http.400","detail":"Fiscal period is closed"}"#),
        ));
        alerts.handle(&AppEvent::HttpError(
            HttpErrorResponse::new(400).body(r#"{"message":"error.http.400"}"#),
        ));
        alerts.handle(&AppEvent::HttpError(HttpErrorResponse::new(400).body("Bad batch")));

        assert_eq!(
            messages(&alerts),
            vec!["Fiscal period is closed", "error.http.400", "Bad batch"]
        );
    }

    #[test]
    fn test_other_status() {
        let alerts = error_alerts();
        alerts.handle(&AppEvent::HttpError(
            HttpErrorResponse::new(500).body(r#"{"message":"error.http.500","detail":"Report batch failed"}"#),
        ));
        alerts.handle(&AppEvent::HttpError(HttpErrorResponse::new(503).body("Service Unavailable")));

        assert_eq!(messages(&alerts), vec!["Report batch failed", "Service Unavailable"]);
    }

    #[test]
    fn test_app_error_and_close() {
        let alerts = error_alerts();
        let added = alerts.handle(&AppEvent::Error("Upload failed".to_string()));

        assert_eq!(messages(&alerts), vec!["Upload failed"]);
        assert!(alerts.close(&added[0]));
        assert!(alerts.alerts().is_empty());
        assert!(!alerts.close(&added[0]));
    }

    #[test]
    fn test_manager_internal_list_untouched() {
        let manager = Arc::new(AlertManager::new(AlertConfig::sticky()));
        let alerts = ErrorAlerts::new(Arc::clone(&manager));

        alerts.handle(&AppEvent::Error("boom".to_string()));

        assert_eq!(alerts.alerts().len(), 1);
        assert!(manager.get().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_consumes_events() {
        let manager = Arc::new(AlertManager::default());
        let alerts = Arc::new(ErrorAlerts::new(manager));
        let view = alerts.alerts();
        let (tx, rx) = broadcast::channel(16);

        let handle = Arc::clone(&alerts).spawn(rx);
        tx.send(AppEvent::HttpError(HttpErrorResponse::new(0))).unwrap();
        tx.send(AppEvent::Error("Upload failed".to_string())).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(view.len(), 2);

        // error alerts expire with the default timeout
        tokio::time::sleep(Duration::from_millis(5001)).await;
        assert!(view.is_empty());
    }
}

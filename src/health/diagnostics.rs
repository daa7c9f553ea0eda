//! Health diagnostics record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Labels that mark the voice service as failing even when it answers.
const ERROR_LABELS: &[&str] = &["error", "unhealthy", "down", "failed"];

/// Outcome of the HTTP status request.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub reachable: bool,
    pub label: String,
    /// Set when the status request returned a non-2xx code.
    pub error_status: bool,
    pub services: Option<BTreeMap<String, Value>>,
    pub error: Option<String>,
}

impl StatusReport {
    pub fn unreachable(error: String) -> Self {
        Self {
            reachable: false,
            label: "unreachable".to_string(),
            error_status: false,
            services: None,
            error: Some(error),
        }
    }

    /// Interpret an HTTP answer; `body` is the parsed JSON body, if any.
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        let success = (200..300).contains(&status);
        let object = body.as_ref().and_then(Value::as_object);

        let reported = object
            .and_then(|o| o.get("status"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let services = object
            .and_then(|o| o.get("services"))
            .and_then(Value::as_object)
            .map(|s| s.iter().map(|(k, v)| (k.clone(), v.clone())).collect());

        let label = if success {
            reported.unwrap_or_else(|| "ok".to_string())
        } else {
            format!("http_{}", status)
        };

        Self {
            reachable: true,
            label,
            error_status: !success,
            services,
            error: None,
        }
    }

    pub fn is_error_flagged(&self) -> bool {
        self.error_status
            || ERROR_LABELS
                .iter()
                .any(|flag| self.label.eq_ignore_ascii_case(flag))
    }
}

/// Snapshot of the voice service's health, built fresh for each probe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDiagnostics {
    pub healthy: bool,
    pub reachable: bool,
    pub status: String,
    pub websocket_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub upstream: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthDiagnostics {
    /// Combine both probe results.
    ///
    /// Healthy only when reachable, upgrade-capable and not error-flagged.
    pub fn combine(upstream: String, status: StatusReport, websocket_available: bool) -> Self {
        let healthy = status.reachable && websocket_available && !status.is_error_flagged();

        Self {
            healthy,
            reachable: status.reachable,
            status: status.label,
            websocket_available,
            services: status.services,
            error: status.error,
            upstream,
            timestamp: Utc::now(),
        }
    }
}

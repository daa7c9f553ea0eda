//! Voice service health probe.
//!
//! # Responsibilities
//! - Request the status path over HTTP with a bounded timeout
//! - Open and immediately close a WebSocket session with its own timeout
//! - Fold both results into a `HealthDiagnostics` without ever failing

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::bridge::Connector;
use crate::config::ServiceConfig;
use crate::health::diagnostics::{HealthDiagnostics, StatusReport};
use crate::observability::metrics;

pub struct HealthProbe {
    client: reqwest::Client,
    connector: Arc<dyn Connector>,
    base_url: String,
    status_url: String,
    websocket_url: String,
    status_timeout: Duration,
    upgrade_timeout: Duration,
    close_grace: Duration,
}

impl HealthProbe {
    pub fn from_config(
        config: &ServiceConfig,
        client: reqwest::Client,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            connector,
            base_url: config.upstream.base_url.clone(),
            status_url: config.upstream.status_url()?.to_string(),
            websocket_url: config.upstream.websocket_url()?.to_string(),
            status_timeout: config.timeouts.health(),
            upgrade_timeout: config.timeouts.upgrade_probe(),
            close_grace: config.timeouts.close_grace(),
        })
    }

    /// Probe the voice service. Both checks run concurrently.
    pub async fn check(&self) -> HealthDiagnostics {
        let (status, websocket_available) = tokio::join!(self.check_status(), self.check_upgrade());

        let diagnostics = HealthDiagnostics::combine(self.base_url.clone(), status, websocket_available);

        tracing::debug!(
            healthy = diagnostics.healthy,
            reachable = diagnostics.reachable,
            status = %diagnostics.status,
            websocket_available,
            "Health probe finished"
        );
        metrics::record_health_check(diagnostics.healthy);

        diagnostics
    }

    async fn check_status(&self) -> StatusReport {
        let response = match self
            .client
            .get(&self.status_url)
            .header("user-agent", "voice-bridge-health-check")
            .timeout(self.status_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::warn!(url = %self.status_url, "Health check failed: timeout");
                return StatusReport::unreachable(format!(
                    "status request timed out after {}ms",
                    self.status_timeout.as_millis()
                ));
            }
            Err(e) => {
                tracing::warn!(url = %self.status_url, error = %e, "Health check failed: connection error");
                return StatusReport::unreachable(e.to_string());
            }
        };

        let status = response.status().as_u16();
        // An empty or non-JSON body still counts as an answer.
        let body = response.json::<serde_json::Value>().await.ok();
        if !(200..300).contains(&status) {
            tracing::warn!(url = %self.status_url, status, "Health check failed: non-success status");
        }

        StatusReport::from_response(status, body)
    }

    async fn check_upgrade(&self) -> bool {
        match time::timeout(self.upgrade_timeout, self.connector.connect(&self.websocket_url)).await {
            Ok(Ok(mut session)) => {
                let _ = time::timeout(self.close_grace, session.close()).await;
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(url = %self.websocket_url, error = %e, "WebSocket upgrade check failed");
                false
            }
            Err(_) => {
                tracing::warn!(url = %self.websocket_url, "WebSocket upgrade check timed out");
                false
            }
        }
    }
}

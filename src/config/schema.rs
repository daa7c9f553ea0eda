//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the voice bridge service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Remote voice service location.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request validation rules for the bridge.
    pub bridge: BridgeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Inbound request hardening.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Remote voice service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// HTTP origin of the voice service (e.g., "http://localhost:8000").
    pub base_url: String,

    /// Path of the WebSocket endpoint on the voice service.
    pub ws_path: String,

    /// Explicit WebSocket URL; overrides the one derived from `base_url`.
    pub ws_url: Option<String>,

    /// Path probed over plain HTTP by the health check.
    pub status_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            ws_path: "/ws".to_string(),
            ws_url: None,
            status_path: "/status".to_string(),
        }
    }
}

impl UpstreamConfig {
    /// URL of the HTTP status endpoint.
    pub fn status_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(&self.status_path);
        Ok(url)
    }

    /// URL of the WebSocket endpoint.
    ///
    /// `http` maps to `ws` and `https` to `wss` unless `ws_url` is set.
    pub fn websocket_url(&self) -> Result<Url, url::ParseError> {
        if let Some(explicit) = &self.ws_url {
            return Url::parse(explicit);
        }

        let base = Url::parse(&self.base_url)?;
        let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
        let rest = &base.as_str()[base.scheme().len()..];

        let mut url = Url::parse(&format!("{}{}", scheme, rest))?;
        url.set_path(&self.ws_path);
        Ok(url)
    }
}

/// Timeout configuration for upstream and inbound operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// WebSocket session establishment budget in milliseconds.
    pub connect_ms: u64,

    /// Budget for the correlated reply, counted from the request send.
    pub response_ms: u64,

    /// Budget for the HTTP status request of the health probe.
    pub health_ms: u64,

    /// Budget for the WebSocket open-then-close check of the health probe.
    pub upgrade_probe_ms: u64,

    /// Upper bound on the close handshake during teardown.
    pub close_grace_ms: u64,

    /// Total time allowed for one inbound HTTP request, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 5_000,
            response_ms: 30_000,
            health_ms: 5_000,
            upgrade_probe_ms: 3_000,
            close_grace_ms: 1_000,
            request_secs: 45,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn response(&self) -> Duration {
        Duration::from_millis(self.response_ms)
    }

    pub fn health(&self) -> Duration {
        Duration::from_millis(self.health_ms)
    }

    pub fn upgrade_probe(&self) -> Duration {
        Duration::from_millis(self.upgrade_probe_ms)
    }

    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }
}

/// Bridge request rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum message length in characters, after trimming.
    pub max_message_chars: usize,

    /// Personas a request may address (case-sensitive).
    pub personas: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 500,
            personas: ["CEO", "CFO", "CTO", "CMO", "COO", "CHRO"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 16 * 1024,
        }
    }
}

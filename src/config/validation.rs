//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and upstream URLs
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Require the inbound request budget to outlast the bridge timeouts
//! - Check the persona allow-list for blanks and duplicates
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "timeouts.connect_ms").
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    check_upstream(config, &mut errors);
    check_timeouts(config, &mut errors);
    check_bridge(config, &mut errors);

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }
    if !matches!(observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}' (expected pretty or json)", observability.log_format),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream(config: &ServiceConfig, errors: &mut Vec<ValidationError>) {
    let upstream = &config.upstream;

    match url::Url::parse(&upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("scheme '{}' is not http or https", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.base_url", e.to_string())),
    }

    if let Some(ws_url) = &upstream.ws_url {
        match url::Url::parse(ws_url) {
            Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
            Ok(url) => errors.push(ValidationError::new(
                "upstream.ws_url",
                format!("scheme '{}' is not ws or wss", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("upstream.ws_url", e.to_string())),
        }
    }

    for (field, path) in [
        ("upstream.ws_path", &upstream.ws_path),
        ("upstream.status_path", &upstream.status_path),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(field, "must start with '/'"));
        }
    }
}

fn check_timeouts(config: &ServiceConfig, errors: &mut Vec<ValidationError>) {
    let t = &config.timeouts;
    for (field, value) in [
        ("timeouts.connect_ms", t.connect_ms),
        ("timeouts.response_ms", t.response_ms),
        ("timeouts.health_ms", t.health_ms),
        ("timeouts.upgrade_probe_ms", t.upgrade_probe_ms),
        ("timeouts.close_grace_ms", t.close_grace_ms),
        ("timeouts.request_secs", t.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    // The router timeout must not preempt the bridge's own timeout failures.
    let bridge_budget_ms = t
        .connect_ms
        .saturating_add(t.response_ms)
        .saturating_add(t.close_grace_ms);
    if t.request_secs.saturating_mul(1000) <= bridge_budget_ms {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "must exceed connect_ms + response_ms + close_grace_ms ({}ms)",
                bridge_budget_ms
            ),
        ));
    }
}

fn check_bridge(config: &ServiceConfig, errors: &mut Vec<ValidationError>) {
    let bridge = &config.bridge;

    if bridge.max_message_chars == 0 {
        errors.push(ValidationError::new("bridge.max_message_chars", "must be greater than 0"));
    }

    if bridge.personas.is_empty() {
        errors.push(ValidationError::new("bridge.personas", "at least one persona is required"));
    }

    let mut seen = HashSet::new();
    for persona in &bridge.personas {
        if persona.trim().is_empty() {
            errors.push(ValidationError::new("bridge.personas", "persona names must not be blank"));
        } else if !seen.insert(persona.as_str()) {
            errors.push(ValidationError::new(
                "bridge.personas",
                format!("duplicate persona '{}'", persona),
            ));
        }
    }
}

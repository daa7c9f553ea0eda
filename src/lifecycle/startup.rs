//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration from disk, or fall back to defaults
//! - Apply command-line overrides
//! - Validate the final configuration before anything binds
//!
//! Any startup error is fatal.

use std::path::Path;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::ServiceConfig;
use crate::config::validation::validate_config;

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub upstream_url: Option<String>,
}

/// Produce the validated configuration the service runs with.
pub fn resolve_config(path: Option<&Path>, overrides: Overrides) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(bind_address) = overrides.bind_address {
        config.listener.bind_address = bind_address;
    }
    if let Some(upstream_url) = overrides.upstream_url {
        config.upstream.base_url = upstream_url;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

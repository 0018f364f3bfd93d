//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject settings that would make every injection produce a broken image
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: InjectorConfig → Result<(), Vec<ValidationError>>
//! - Malformed resource limits are not errors; injection falls back to defaults

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::InjectorConfig;
use crate::model::Quantity;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    MaxBodyBytes,

    #[error("sidecar.image must not be empty")]
    EmptyImage,

    #[error("sidecar.version must not be empty")]
    EmptyVersion,

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.log_format {0:?} is not one of pretty, json")]
    LogFormat(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &InjectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::MaxBodyBytes);
    }
    if config.sidecar.image.trim().is_empty() {
        errors.push(ValidationError::EmptyImage);
    }
    if config.sidecar.version.trim().is_empty() {
        errors.push(ValidationError::EmptyVersion);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    let obs = &config.observability;
    if !LOG_LEVELS.contains(&obs.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(obs.log_level.clone()));
    }
    if !LOG_FORMATS.contains(&obs.log_format.as_str()) {
        errors.push(ValidationError::LogFormat(obs.log_format.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Warn about resource limits that will fall back at injection time.
pub fn warn_on_limits(config: &InjectorConfig) {
    let limits = [
        ("sidecar.cpu_limit", &config.sidecar.cpu_limit),
        ("sidecar.memory_limit", &config.sidecar.memory_limit),
    ];
    for (field, value) in limits {
        if let Err(e) = value.parse::<Quantity>() {
            tracing::warn!(field, value = %value, error = %e, "Resource limit will fall back to default");
        }
    }
}

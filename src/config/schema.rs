//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the injector.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::inject::resources::{DEFAULT_CPU_LIMIT, DEFAULT_MEMORY_LIMIT};

/// Root configuration for the injector service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InjectorConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Sidecar image and limits.
    pub sidecar: SidecarConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            tls: None,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Sidecar defaults supplied to every injection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SidecarConfig {
    /// Agent image repository.
    pub image: String,

    /// Agent image tag.
    pub version: String,

    /// CPU limit, e.g. "500m". Falls back to the default when malformed.
    pub cpu_limit: String,

    /// Memory limit, e.g. "128Mi". Falls back to the default when malformed.
    pub memory_limit: String,
}

impl SidecarConfig {
    /// `<image>:<version>`.
    pub fn image_reference(&self) -> String {
        format!("{}:{}", self.image, self.version)
    }
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            image: "jaegertracing/jaeger-agent".to_string(),
            version: "1.7".to_string(),
            cpu_limit: DEFAULT_CPU_LIMIT.to_string(),
            memory_limit: DEFAULT_MEMORY_LIMIT.to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 10 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
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
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

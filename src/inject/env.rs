//! Observability environment variables.
//!
//! # Responsibilities
//! - Compute `SERVICE_NAME` (`<app>.<namespace>`) and `PROPAGATION_FORMAT`
//! - Honour values the primary container already defines
//! - Append missing defaults without disturbing existing entries
//!
//! # Design Decisions
//! - Defaults are appended in a fixed order: service name, then propagation
//! - Existing entries keep their value and position

use crate::inject::{DEFAULT_PROPAGATION, ENV_PROPAGATION, ENV_SERVICE_NAME};
use crate::model::instance::DEFAULT_NAMESPACE;
use crate::model::{Container, EnvVar, Workload};

/// Label holding the application name.
pub const APP_LABEL: &str = "app";

/// `<app>.<namespace>` for a workload, in DNS style.
pub fn service_name(workload: &Workload) -> String {
    let app = workload.label(APP_LABEL).unwrap_or_default();
    let namespace = match workload.namespace.as_deref() {
        Some(ns) if !ns.is_empty() => ns,
        _ => DEFAULT_NAMESPACE,
    };
    format!("{app}.{namespace}")
}

/// The computed defaults, ignoring anything already set on containers.
pub fn defaults(workload: &Workload) -> Vec<EnvVar> {
    vec![
        EnvVar::new(ENV_SERVICE_NAME, service_name(workload)),
        EnvVar::new(ENV_PROPAGATION, DEFAULT_PROPAGATION),
    ]
}

/// The two observability variables, with the primary container's own values winning.
pub fn build_env(workload: &Workload) -> Vec<EnvVar> {
    let primary = workload.primary();
    defaults(workload)
        .into_iter()
        .map(|default| {
            primary
                .and_then(|c| c.env_var(&default.name))
                .cloned()
                .unwrap_or(default)
        })
        .collect()
}

/// Append each of `defaults` the container does not already define.
pub fn decorate(container: &mut Container, defaults: &[EnvVar]) {
    for default in defaults {
        if !container.has_env(&default.name) {
            container.env.push(default.clone());
        }
    }
}

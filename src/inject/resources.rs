//! Sidecar resource limits.
//!
//! Malformed overrides never fail an injection: each field falls back to its
//! own default independently and the problem is only logged.

use std::collections::BTreeMap;

use crate::model::{Quantity, Workload, RESOURCE_CPU, RESOURCE_MEMORY};

/// CPU limit used when the configured value does not parse.
pub const DEFAULT_CPU_LIMIT: &str = "500m";

/// Memory limit used when the configured value does not parse.
pub const DEFAULT_MEMORY_LIMIT: &str = "128Mi";

/// Per-workload CPU limit override.
pub const ANNOTATION_MAX_CPU: &str = "jaeger-agent-max-cpu";

/// Per-workload memory limit override.
pub const ANNOTATION_MAX_MEMORY: &str = "jaeger-agent-max-memory";

/// Resolved sidecar limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLimits {
    pub cpu: Quantity,
    pub memory: Quantity,
}

impl ResourceLimits {
    /// As a container `resourceLimits` map.
    pub fn into_map(self) -> BTreeMap<String, Quantity> {
        BTreeMap::from([
            (RESOURCE_CPU.to_string(), self.cpu),
            (RESOURCE_MEMORY.to_string(), self.memory),
        ])
    }
}

/// Parse the configured limits, substituting defaults for malformed values.
pub fn resolve_limits(cpu: &str, memory: &str) -> ResourceLimits {
    ResourceLimits {
        cpu: parse_or_default(RESOURCE_CPU, cpu, DEFAULT_CPU_LIMIT),
        memory: parse_or_default(RESOURCE_MEMORY, memory, DEFAULT_MEMORY_LIMIT),
    }
}

/// Resolve limits for a workload: its annotations override the configured values.
pub fn resolve_for_workload(workload: &Workload, cpu: &str, memory: &str) -> ResourceLimits {
    resolve_limits(
        workload.annotation(ANNOTATION_MAX_CPU).unwrap_or(cpu),
        workload.annotation(ANNOTATION_MAX_MEMORY).unwrap_or(memory),
    )
}

fn parse_or_default(kind: &str, value: &str, default: &'static str) -> Quantity {
    match value.parse::<Quantity>() {
        Ok(quantity) => quantity,
        Err(e) => {
            tracing::warn!(
                resource = kind,
                value = %value,
                default = default,
                error = %e,
                "Invalid sidecar resource limit, using default"
            );
            fallback(default)
        }
    }
}

fn fallback(default: &'static str) -> Quantity {
    match default.parse() {
        Ok(quantity) => quantity,
        Err(e) => unreachable!("built-in default {default:?} must parse: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    #[test]
    fn test_defaults_parse() {
        let limits = resolve_limits(DEFAULT_CPU_LIMIT, DEFAULT_MEMORY_LIMIT);
        assert_eq!(limits.cpu, q("500m"));
        assert_eq!(limits.memory, q("128Mi"));
    }

    #[test]
    fn test_override() {
        let limits = resolve_limits("1024m", "100Mi");
        assert_eq!(limits.cpu, q("1024m"));
        assert_eq!(limits.memory, q("100Mi"));
        assert_eq!(limits.cpu.as_str(), "1024m");
    }

    #[test]
    fn test_parse_error_falls_back() {
        let limits = resolve_limits("1024m0", "100MiB");
        assert_eq!(limits.cpu, q("500m"));
        assert_eq!(limits.memory, q("128Mi"));
    }

    #[test]
    fn test_fields_fall_back_independently() {
        let limits = resolve_limits("garbage", "256Mi");
        assert_eq!(limits.cpu, q("500m"));
        assert_eq!(limits.memory, q("256Mi"));

        let limits = resolve_limits("2", "");
        assert_eq!(limits.cpu, q("2"));
        assert_eq!(limits.memory, q("128Mi"));
    }

    #[test]
    fn test_workload_annotations_override_config() {
        let mut workload = Workload::default();
        workload
            .annotations
            .insert(ANNOTATION_MAX_CPU.into(), "250m".into());

        let limits = resolve_for_workload(&workload, "1", "64Mi");
        assert_eq!(limits.cpu, q("250m"));
        assert_eq!(limits.memory, q("64Mi"));
    }

    #[test]
    fn test_into_map() {
        let map = resolve_limits("1", "1Gi").into_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map[RESOURCE_CPU], q("1"));
        assert_eq!(map[RESOURCE_MEMORY], q("1Gi"));
    }
}

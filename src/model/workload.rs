//! Workload templates and their containers.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::quantity::Quantity;

/// Resource kind key for CPU limits.
pub const RESOURCE_CPU: &str = "cpu";

/// Resource kind key for memory limits.
pub const RESOURCE_MEMORY: &str = "memory";

/// A deployable template: metadata plus an ordered list of containers.
///
/// The primary container is always `containers[0]`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Workload {
    /// Informational name, used only in logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Namespace; `None` or empty means the orchestrator default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub annotations: HashMap<String, String>,

    pub labels: HashMap<String, String>,

    pub containers: Vec<Container>,
}

impl Workload {
    /// Create an empty workload with the given containers.
    pub fn with_containers(containers: Vec<Container>) -> Self {
        Self {
            containers,
            ..Self::default()
        }
    }

    /// The primary container, if any.
    pub fn primary(&self) -> Option<&Container> {
        self.containers.first()
    }

    /// Annotation value by key.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Label value by key.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Name used in log fields.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// A single container in a workload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Container {
    pub name: String,

    pub image: String,

    /// Names are unique within a container.
    pub env: Vec<EnvVar>,

    pub args: Vec<String>,

    /// Resource kind (`cpu`, `memory`) to limit.
    pub resource_limits: BTreeMap<String, Quantity>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
}

impl Container {
    /// Create a container with a name and image and nothing else.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Self::default()
        }
    }

    /// Look up an environment entry by exact name.
    pub fn env_var(&self, name: &str) -> Option<&EnvVar> {
        self.env.iter().find(|e| e.name == name)
    }

    /// Whether an environment entry with this exact name exists.
    pub fn has_env(&self, name: &str) -> bool {
        self.env_var(name).is_some()
    }
}

/// A name/value environment entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnvVar {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named port exposed by a container.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    pub name: String,
    pub container_port: u16,
}

impl ContainerPort {
    pub fn new(name: impl Into<String>, container_port: u16) -> Self {
        Self {
            name: name.into(),
            container_port,
        }
    }
}

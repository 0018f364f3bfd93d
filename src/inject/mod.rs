//! Sidecar injection engine.
//!
//! # Data Flow
//! ```text
//! Workload + candidate BackendInstances
//!     → eligibility.rs (annotation present? sidecar absent?)
//!     → selector.rs (Any | Specific(name) → one instance or none)
//!     → sidecar.rs (assemble and append the agent container)
//!         → env.rs (SERVICE_NAME, PROPAGATION_FORMAT)
//!         → args.rs (sorted --key=value flags)
//!         → resources.rs (cpu/memory limits with fallback)
//!     → mutated Workload
//! ```
//!
//! # Design Decisions
//! - Pure functions over owned or borrowed values; no state between calls
//! - Configuration is passed in explicitly, never read from globals
//! - "No instance" and "not needed" are outcomes, not errors

pub mod args;
pub mod eligibility;
pub mod env;
pub mod resources;
pub mod selector;
pub mod sidecar;

use serde::{Deserialize, Serialize};

use crate::config::SidecarConfig;
use crate::model::{BackendInstance, Workload};
use crate::observability::metrics;

pub use eligibility::needed;
pub use selector::{select, try_select, SelectionError};
pub use sidecar::inject;

/// Current routing annotation key.
pub const ANNOTATION: &str = "sidecar.jaegertracing.io/inject";

/// Deprecated routing annotation key, read when the current one is absent.
pub const ANNOTATION_LEGACY: &str = "inject-jaeger-agent";

/// Name of the injected container.
pub const SIDECAR_NAME: &str = "jaeger-agent";

/// Service name variable read by tracing clients.
pub const ENV_SERVICE_NAME: &str = "SERVICE_NAME";

/// Propagation format variable read by tracing clients.
pub const ENV_PROPAGATION: &str = "PROPAGATION_FORMAT";

/// Propagation formats used when the workload sets none.
pub const DEFAULT_PROPAGATION: &str = "jaeger,b3";

/// What should happen to a workload.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectionDecision<'a> {
    NotNeeded,
    Unresolved(SelectionError),
    Inject(&'a BackendInstance),
}

impl InjectionDecision<'_> {
    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            InjectionDecision::NotNeeded => "not_needed",
            InjectionDecision::Unresolved(_) => "unresolved",
            InjectionDecision::Inject(_) => "injected",
        }
    }
}

/// Result of running a workload through the engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InjectionOutcome {
    pub workload: Workload,
    pub injected: bool,
    pub instance: Option<String>,
    pub reason: Option<String>,
}

/// Front door to the engine with its configuration bound.
#[derive(Debug, Clone, Default)]
pub struct Injector {
    config: SidecarConfig,
}

impl Injector {
    pub fn new(config: SidecarConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SidecarConfig {
        &self.config
    }

    /// Decide without mutating.
    pub fn decide<'a>(&self, workload: &Workload, candidates: &'a [BackendInstance]) -> InjectionDecision<'a> {
        if !needed(workload) {
            return InjectionDecision::NotNeeded;
        }
        match try_select(workload, candidates) {
            Ok(instance) => InjectionDecision::Inject(instance),
            Err(e) => InjectionDecision::Unresolved(e),
        }
    }

    /// Decide and, when an instance resolves, inject.
    pub fn process(&self, workload: Workload, candidates: &[BackendInstance]) -> InjectionOutcome {
        let decision = self.decide(&workload, candidates);
        metrics::record_decision(decision.outcome());

        match decision {
            InjectionDecision::NotNeeded => {
                tracing::debug!(workload = %workload.display_name(), "Sidecar injection not needed");
                InjectionOutcome {
                    workload,
                    injected: false,
                    instance: None,
                    reason: None,
                }
            }
            InjectionDecision::Unresolved(e) => {
                tracing::warn!(
                    workload = %workload.display_name(),
                    candidates = candidates.len(),
                    reason = %e,
                    "No backend instance resolved, leaving workload untouched"
                );
                InjectionOutcome {
                    workload,
                    injected: false,
                    instance: None,
                    reason: Some(e.to_string()),
                }
            }
            InjectionDecision::Inject(instance) => {
                let workload = inject(workload, instance, &self.config);
                tracing::info!(
                    workload = %workload.display_name(),
                    instance = %instance.name,
                    "Sidecar injected"
                );
                InjectionOutcome {
                    workload,
                    injected: true,
                    instance: Some(instance.name.clone()),
                    reason: None,
                }
            }
        }
    }
}

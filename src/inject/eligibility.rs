//! Decide whether a workload should receive a sidecar at all.

use crate::inject::{ANNOTATION, ANNOTATION_LEGACY, SIDECAR_NAME};
use crate::model::Workload;

/// Whether `workload` asks for a sidecar and does not have one yet.
pub fn needed(workload: &Workload) -> bool {
    let annotated = workload.annotations.contains_key(ANNOTATION)
        || workload.annotations.contains_key(ANNOTATION_LEGACY);
    if !annotated {
        return false;
    }

    if workload.containers.is_empty() {
        return false;
    }

    !has_sidecar(workload)
}

/// Whether any container already carries the sidecar name.
pub fn has_sidecar(workload: &Workload) -> bool {
    workload.containers.iter().any(|c| c.name == SIDECAR_NAME)
}

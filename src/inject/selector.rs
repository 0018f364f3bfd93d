//! Backend instance selection.
//!
//! # Responsibilities
//! - Read the routing annotation (current key first, then legacy)
//! - Resolve `Specific(name)` by exact name
//! - Resolve `Any` only when exactly one candidate exists
//!
//! # Design Decisions
//! - Ambiguity is rejected, never broken by iteration order
//! - Failures carry a reason for logs but reach callers as `None`

use thiserror::Error;

use crate::inject::{ANNOTATION, ANNOTATION_LEGACY};
use crate::model::{BackendInstance, Routing, Workload};

/// Why no instance was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("workload carries no routing annotation")]
    MissingAnnotation,

    #[error("no backend instances available")]
    NoCandidates,

    #[error("{count} backend instances available, refusing to pick one")]
    Ambiguous { count: usize },

    #[error("backend instance {name:?} not found")]
    NotFound { name: String },
}

/// The routing target requested by a workload, if it has one.
pub fn routing(workload: &Workload) -> Option<Routing> {
    workload
        .annotation(ANNOTATION)
        .or_else(|| workload.annotation(ANNOTATION_LEGACY))
        .map(Routing::parse)
}

/// Resolve the instance a workload should report to.
pub fn try_select<'a>(
    workload: &Workload,
    candidates: &'a [BackendInstance],
) -> Result<&'a BackendInstance, SelectionError> {
    match routing(workload).ok_or(SelectionError::MissingAnnotation)? {
        Routing::Specific(name) => candidates
            .iter()
            .find(|c| c.name == name)
            .ok_or(SelectionError::NotFound { name }),
        Routing::Any => match candidates {
            [only] => Ok(only),
            [] => Err(SelectionError::NoCandidates),
            _ => Err(SelectionError::Ambiguous {
                count: candidates.len(),
            }),
        },
    }
}

/// Like [`try_select`], discarding the reason.
pub fn select<'a>(workload: &Workload, candidates: &'a [BackendInstance]) -> Option<&'a BackendInstance> {
    try_select(workload, candidates).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload(key: &str, value: &str) -> Workload {
        let mut workload = Workload::default();
        workload.annotations.insert(key.into(), value.into());
        workload
    }

    fn instances(names: &[&str]) -> Vec<BackendInstance> {
        names.iter().map(|n| BackendInstance::new(*n)).collect()
    }

    #[test]
    fn test_select_single_instance() {
        let candidates = instances(&["the-only-instance"]);
        let selected = select(&workload(ANNOTATION, "true"), &candidates).unwrap();
        assert_eq!(selected.name, "the-only-instance");
    }

    #[test]
    fn test_cannot_select_from_many() {
        let candidates = instances(&["first", "second"]);
        assert_eq!(
            try_select(&workload(ANNOTATION, "true"), &candidates),
            Err(SelectionError::Ambiguous { count: 2 })
        );
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(
            try_select(&workload(ANNOTATION, "true"), &[]),
            Err(SelectionError::NoCandidates)
        );
    }

    #[test]
    fn test_select_by_name() {
        let candidates = instances(&["first", "second", "third"]);
        let selected = select(&workload(ANNOTATION_LEGACY, "second"), &candidates).unwrap();
        assert_eq!(selected.name, "second");
    }

    #[test]
    fn test_unknown_name() {
        let candidates = instances(&["first"]);
        assert_eq!(
            try_select(&workload(ANNOTATION, "missing"), &candidates),
            Err(SelectionError::NotFound { name: "missing".into() })
        );
    }

    #[test]
    fn test_missing_annotation() {
        let candidates = instances(&["first"]);
        assert_eq!(
            try_select(&Workload::default(), &candidates),
            Err(SelectionError::MissingAnnotation)
        );
    }

    #[test]
    fn test_current_key_wins_over_legacy() {
        let mut w = workload(ANNOTATION, "second");
        w.annotations.insert(ANNOTATION_LEGACY.into(), "first".into());
        let candidates = instances(&["first", "second"]);
        assert_eq!(select(&w, &candidates).unwrap().name, "second");
        assert_eq!(routing(&w), Some(Routing::Specific("second".into())));
    }
}

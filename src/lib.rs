//! Tracing-agent sidecar injector.
//!
//! Decides whether a workload gets a `jaeger-agent` sidecar, which backend
//! instance it reports to, and builds that sidecar deterministically.

pub mod config;
pub mod http;
pub mod inject;
pub mod lifecycle;
pub mod model;
pub mod observability;

pub use config::schema::InjectorConfig;
pub use http::HttpServer;
pub use inject::{InjectionDecision, InjectionOutcome, Injector};
pub use lifecycle::Shutdown;
pub use model::{BackendInstance, Container, EnvVar, Workload};

//! Domain model shared by the injection engine and its surfaces.
//!
//! # Data Flow
//! ```text
//! JSON body / JSON file
//!     → workload.rs (Workload, Container, EnvVar, ContainerPort)
//!     → instance.rs (BackendInstance, Options, Routing)
//!     → quantity.rs (resource amounts on container limits)
//!     → handed to the inject engine by value or reference
//! ```
//!
//! # Design Decisions
//! - Every value is transient; nothing here is cached between calls
//! - Wire names are camelCase to match container orchestrator manifests
//! - Options stay an unordered map; ordering is imposed by the arg builder

pub mod instance;
pub mod quantity;
pub mod workload;

pub use instance::{BackendInstance, OptionValue, Options, Routing};
pub use quantity::{Quantity, QuantityError};
pub use workload::{Container, ContainerPort, EnvVar, Workload, RESOURCE_CPU, RESOURCE_MEMORY};

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → InjectorConfig (validated, immutable)
//!     → SidecarConfig handed to the engine by value
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps it into an ArcSwap
//!     → next request sees the new config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - The engine never reads config from globals; it is passed in

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::InjectorConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::SidecarConfig;
pub use schema::TlsConfig;

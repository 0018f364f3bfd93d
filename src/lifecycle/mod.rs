//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server stops accepting → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Config reload is driven by the file watcher, not by SIGHUP
//! - In-flight requests drain before exit

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

//! HTTP surface of the injector.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID)
//!     → middleware.rs (request metrics by route and status)
//!     → handlers.rs (decode body, call the inject engine, encode result)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;
pub mod tls;

pub use handlers::{InjectRequest, SelectResponse};
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};

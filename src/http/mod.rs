//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → security::cors (preflight short-circuit)
//!     → routing (match service)
//!     → proxy::forwarder (send upstream)
//!     → response.rs (relay, strip hop headers)
//!     → security::cors (attach headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};

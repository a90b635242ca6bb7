//! Boundary header policy.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight short-circuit)
//!     → routing / forwarding
//!         → headers.rs (strip hop-by-hop, rewrite Host, X-Forwarded-For)
//! Outgoing response:
//!     → headers.rs (strip hop-by-hop)
//!     → cors.rs (attach allow/expose headers)
//! ```
//!
//! # Design Decisions
//! - CORS headers are attached to every response, including gateway errors
//! - No trust decisions are made here; authentication is a backend concern

pub mod cors;
pub mod headers;

pub use cors::{CorsConfigError, CorsDecision, CorsPolicy};

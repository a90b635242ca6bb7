//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! RouteMatch { route, forwarded_path }
//!     → target.rs (backend authority, outbound URI)
//!     → forwarder.rs (rewrite headers, pooled client, deadlines)
//!     → ProxyOutcome: relayed response | GatewayError::BackendUnavailable
//! ```
//!
//! # Design Decisions
//! - Failures are returned to the caller, not reported through callbacks
//! - Connection pool per service, internally synchronized by hyper

pub mod forwarder;
pub mod target;

pub use forwarder::{Forwarder, ForwarderSettings, ProxyOutcome, ProxyRequest};
pub use target::{BackendTarget, TargetError};

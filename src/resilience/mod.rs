//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (resolve connect/response deadline per service)
//!     → forwarder enforces them
//!     → On failure: 503 to the caller, no retry
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Single attempt per inbound request; callers own retry policy

pub mod timeouts;

pub use timeouts::UpstreamTimeouts;

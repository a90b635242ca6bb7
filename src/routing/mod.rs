//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (route lookup, longest prefix)
//!     → matcher.rs (segment-boundary prefix match + strip)
//!     → Return: RouteMatch { route, forwarded_path } or None
//!
//! Route Compilation (at startup):
//!     ServiceConfig[]
//!     → Validate prefixes and targets
//!     → Reject duplicate prefixes/names
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - Most specific (longest) prefix wins

pub mod matcher;
pub mod router;

pub use matcher::{PathPrefix, PrefixError};
pub use router::{RouteMatch, RouteTable, RouteTableError, ServiceRoute};

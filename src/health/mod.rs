//! Gateway-owned endpoints.
//!
//! # Data Flow
//! ```text
//! GET /health → liveness.rs (fixed payload, no backend contact)
//! GET /       → discovery.rs (registered route listing)
//! ```
//!
//! # Design Decisions
//! - Liveness attests only that this process accepts connections
//! - Backends are never probed

pub mod discovery;
pub mod liveness;

pub use discovery::discovery;
pub use liveness::liveness;

/// Identity reported by the gateway endpoints.
#[derive(Debug, Clone)]
pub struct GatewayIdentity {
    pub name: String,
    pub health_path: String,
}

impl GatewayIdentity {
    pub fn new(name: impl Into<String>, health_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            health_path: health_path.into(),
        }
    }
}

//! Timeout enforcement.
//!
//! # Responsibilities
//! - Resolve per-service connect and response deadlines
//! - Fall back to the gateway-wide defaults
//!
//! # Design Decisions
//! - Every upstream call has a deadline; there is no "wait forever"
//! - Connect timeout is enforced by the connector, response timeout by Tokio
//! - Timed-out requests are reported as service unavailable, never retried

use std::time::Duration;

use crate::config::{ServiceConfig, TimeoutConfig};

/// Deadlines applied to one service's upstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    /// Bound on TCP connection establishment.
    pub connect: Duration,
    /// Bound on waiting for response headers once the request is sent.
    pub response: Duration,
}

impl UpstreamTimeouts {
    /// Service overrides win over the gateway defaults.
    pub fn resolve(defaults: &TimeoutConfig, service: &ServiceConfig) -> Self {
        Self {
            connect: Duration::from_secs(
                service.connect_timeout_secs.unwrap_or(defaults.connect_secs),
            ),
            response: Duration::from_secs(
                service.response_timeout_secs.unwrap_or(defaults.response_secs),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_override_wins() {
        let defaults = TimeoutConfig::default();
        let mut service = ServiceConfig::new("video", "/video", "localhost:8086");
        assert_eq!(
            UpstreamTimeouts::resolve(&defaults, &service),
            UpstreamTimeouts {
                connect: Duration::from_secs(5),
                response: Duration::from_secs(30),
            }
        );

        service.response_timeout_secs = Some(120);
        let timeouts = UpstreamTimeouts::resolve(&defaults, &service);
        assert_eq!(timeouts.connect, Duration::from_secs(5));
        assert_eq!(timeouts.response, Duration::from_secs(120));
    }
}

//! Route table and lookup.
//!
//! # Responsibilities
//! - Store the registered services in configuration order
//! - Reject duplicate prefixes and names at construction
//! - Look up the most specific route for a path
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) prefix scan (acceptable for typical route counts)
//! - Explicit `None` rather than a silent default route

use thiserror::Error;

use crate::config::{ServiceConfig, TimeoutConfig};
use crate::proxy::target::{BackendTarget, TargetError};
use crate::resilience::UpstreamTimeouts;
use crate::routing::matcher::{PathPrefix, PrefixError};

/// Errors raised while building the route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("service {service:?}: {source}")]
    InvalidPrefix {
        service: String,
        #[source]
        source: PrefixError,
    },

    #[error("service {service:?}: {source}")]
    InvalidTarget {
        service: String,
        #[source]
        source: TargetError,
    },

    #[error("services {first:?} and {second:?} share path prefix {prefix:?}")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("service name {0:?} is registered more than once")]
    DuplicateName(String),

    #[error("service name must not be empty (prefix {0:?})")]
    EmptyName(String),
}

/// A backend service registered under a path prefix.
#[derive(Debug, Clone)]
pub struct ServiceRoute {
    name: String,
    prefix: PathPrefix,
    target: BackendTarget,
    strip_prefix: bool,
    timeouts: UpstreamTimeouts,
}

impl ServiceRoute {
    pub fn new(
        name: impl Into<String>,
        prefix: PathPrefix,
        target: BackendTarget,
        strip_prefix: bool,
        timeouts: UpstreamTimeouts,
    ) -> Self {
        Self {
            name: name.into(),
            prefix,
            target,
            strip_prefix,
            timeouts,
        }
    }

    /// Build a route from its configuration entry.
    pub fn from_config(
        config: &ServiceConfig,
        defaults: &TimeoutConfig,
    ) -> Result<Self, RouteTableError> {
        let prefix = PathPrefix::parse(&config.path_prefix).map_err(|source| {
            RouteTableError::InvalidPrefix {
                service: config.name.clone(),
                source,
            }
        })?;
        let target = BackendTarget::parse(&config.target).map_err(|source| {
            RouteTableError::InvalidTarget {
                service: config.name.clone(),
                source,
            }
        })?;
        Ok(Self::new(
            config.name.clone(),
            prefix,
            target,
            config.strip_prefix,
            UpstreamTimeouts::resolve(defaults, config),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &PathPrefix {
        &self.prefix
    }

    pub fn target(&self) -> &BackendTarget {
        &self.target
    }

    pub fn strip_prefix(&self) -> bool {
        self.strip_prefix
    }

    pub fn timeouts(&self) -> UpstreamTimeouts {
        self.timeouts
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, Copy)]
pub struct RouteMatch<'t, 'p> {
    /// The matched service.
    pub route: &'t ServiceRoute,
    /// Path to request from the backend (never empty).
    pub forwarded_path: &'p str,
}

/// Immutable, ordered set of service routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<ServiceRoute>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate prefixes and names.
    pub fn new(routes: Vec<ServiceRoute>) -> Result<Self, RouteTableError> {
        for (i, route) in routes.iter().enumerate() {
            if route.name.is_empty() {
                return Err(RouteTableError::EmptyName(route.prefix.to_string()));
            }
            for earlier in &routes[..i] {
                if earlier.prefix == route.prefix {
                    return Err(RouteTableError::DuplicatePrefix {
                        prefix: route.prefix.to_string(),
                        first: earlier.name.clone(),
                        second: route.name.clone(),
                    });
                }
                if earlier.name == route.name {
                    return Err(RouteTableError::DuplicateName(route.name.clone()));
                }
            }
        }
        Ok(Self { routes })
    }

    /// Compile the configured services.
    pub fn from_config(
        services: &[ServiceConfig],
        defaults: &TimeoutConfig,
    ) -> Result<Self, RouteTableError> {
        let routes = services
            .iter()
            .map(|service| ServiceRoute::from_config(service, defaults))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(routes)
    }

    /// Find the most specific route for `path`.
    pub fn match_path<'t, 'p>(&'t self, path: &'p str) -> Option<RouteMatch<'t, 'p>> {
        self.routes
            .iter()
            .filter_map(|route| route.prefix.strip(path).map(|rest| (route, rest)))
            .max_by_key(|(route, _)| route.prefix.len())
            .map(|(route, rest)| RouteMatch {
                route,
                forwarded_path: if route.strip_prefix { rest } else { path },
            })
    }

    /// Routes in configuration order.
    pub fn routes(&self) -> &[ServiceRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate prefixes and targets of every service
//! - Detect conflicting routes (duplicate prefixes or names)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the listener is bound

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::{RouteTableError, ServiceRoute};
use crate::security::cors::{CorsConfigError, CorsPolicy};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error(transparent)]
    Route(#[from] RouteTableError),

    #[error("service {service:?}: {field} must be greater than zero")]
    ZeroServiceTimeout { service: String, field: &'static str },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("service {service:?}: prefix {prefix:?} is reserved for the health endpoint")]
    ReservedPrefix { service: String, prefix: String },

    #[error("endpoints.health_path {0:?} is not a plain absolute path")]
    HealthPath(String),

    #[error(transparent)]
    Cors(#[from] CorsConfigError),

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.response_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("response_secs"));
    }

    let health_path = &config.endpoints.health_path;
    if !is_plain_path(health_path) {
        errors.push(ValidationError::HealthPath(health_path.clone()));
    }

    let mut prefixes: HashMap<&str, &str> = HashMap::new();
    let mut names: HashMap<&str, ()> = HashMap::new();

    for service in &config.services {
        if let Err(err) = ServiceRoute::from_config(service, &config.timeouts) {
            errors.push(err.into());
        }

        if service.name.is_empty() {
            errors.push(RouteTableError::EmptyName(service.path_prefix.clone()).into());
        } else if names.insert(service.name.as_str(), ()).is_some() {
            errors.push(RouteTableError::DuplicateName(service.name.clone()).into());
        }

        match prefixes.entry(service.path_prefix.as_str()) {
            Entry::Occupied(first) => errors.push(
                RouteTableError::DuplicatePrefix {
                    prefix: service.path_prefix.clone(),
                    first: first.get().to_string(),
                    second: service.name.clone(),
                }
                .into(),
            ),
            Entry::Vacant(slot) => {
                slot.insert(service.name.as_str());
            }
        }

        if &service.path_prefix == health_path {
            errors.push(ValidationError::ReservedPrefix {
                service: service.name.clone(),
                prefix: service.path_prefix.clone(),
            });
        }

        if service.connect_timeout_secs == Some(0) {
            errors.push(ValidationError::ZeroServiceTimeout {
                service: service.name.clone(),
                field: "connect_timeout_secs",
            });
        }
        if service.response_timeout_secs == Some(0) {
            errors.push(ValidationError::ZeroServiceTimeout {
                service: service.name.clone(),
                field: "response_timeout_secs",
            });
        }
    }

    if let Err(err) = CorsPolicy::from_config(&config.cors) {
        errors.push(err.into());
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `/segment[/segment...]` made of URL-safe characters, not `/` alone.
fn is_plain_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    !rest.is_empty()
        && rest.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServiceConfig;

    fn config_with(services: Vec<ServiceConfig>) -> GatewayConfig {
        GatewayConfig {
            services,
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = config_with(vec![
            ServiceConfig::new("auth", "/auth", "localhost:8080"),
            ServiceConfig::new("login", "/auth", "localhost:8081"),
            ServiceConfig::new("bad-prefix", "profile", "localhost:8082"),
            ServiceConfig::new("bad-target", "/video", "https://video:443"),
        ]);
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.response_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors.contains(&ValidationError::BindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::ZeroTimeout("response_secs")));
        assert!(errors.contains(&ValidationError::Route(RouteTableError::DuplicatePrefix {
            prefix: "/auth".into(),
            first: "auth".into(),
            second: "login".into(),
        })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Route(RouteTableError::InvalidPrefix { .. }))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Route(RouteTableError::InvalidTarget { .. }))));
    }

    #[test]
    fn duplicate_names_rejected() {
        let config = config_with(vec![
            ServiceConfig::new("auth", "/auth", "localhost:8080"),
            ServiceConfig::new("auth", "/login", "localhost:8081"),
        ]);
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::Route(RouteTableError::DuplicateName("auth".into()))])
        );
    }

    #[test]
    fn health_path_is_reserved() {
        let config = config_with(vec![ServiceConfig::new("status", "/health", "localhost:9000")]);
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::ReservedPrefix {
                service: "status".into(),
                prefix: "/health".into(),
            }])
        );
    }

    #[test]
    fn health_path_shape() {
        assert!(is_plain_path("/health"));
        assert!(is_plain_path("/internal/live-z"));
        assert!(!is_plain_path("/"));
        assert!(!is_plain_path("health"));
        assert!(!is_plain_path("/health/"));
        assert!(!is_plain_path("/{id}"));
        assert!(!is_plain_path("/:id"));
    }

    #[test]
    fn zero_service_timeout_rejected() {
        let mut service = ServiceConfig::new("auth", "/auth", "localhost:8080");
        service.connect_timeout_secs = Some(0);
        let errors = validate_config(&config_with(vec![service])).unwrap_err();
        assert_eq!(
            errors,
            [ValidationError::ZeroServiceTimeout {
                service: "auth".into(),
                field: "connect_timeout_secs",
            }]
        );
    }

    #[test]
    fn observability_checks() {
        let mut config = GatewayConfig::default();
        config.observability.log_level = "verbose".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "localhost".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            [
                ValidationError::LogLevel("verbose".into()),
                ValidationError::MetricsAddress("localhost".into()),
            ]
        );
    }

    #[test]
    fn empty_service_table_is_allowed() {
        assert_eq!(validate_config(&config_with(Vec::new())), Ok(()));
    }
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the route table, CORS policy and forwarder
//! - Start the metrics exporter when enabled
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::schema::ObservabilityConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::config::{GatewayConfig, ListenerConfig};
use crate::health::GatewayIdentity;
use crate::http::{AppState, HttpServer};
use crate::observability::metrics;
use crate::proxy::{Forwarder, ForwarderSettings};
use crate::routing::{RouteTable, RouteTableError};
use crate::security::{CorsConfigError, CorsPolicy};

/// Fatal errors before the gateway starts serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", render(.0))]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Routes(#[from] RouteTableError),

    #[error(transparent)]
    Cors(#[from] CorsConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

fn render(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Validate `config` and assemble the server. Nothing is bound yet.
pub fn prepare(config: &GatewayConfig) -> Result<HttpServer, StartupError> {
    validate_config(config).map_err(StartupError::Invalid)?;

    let routes = RouteTable::from_config(&config.services, &config.timeouts)?;
    let cors = CorsPolicy::from_config(&config.cors)?;
    let forwarder = Forwarder::new(&routes, &ForwarderSettings::from_config(config));

    for route in routes.routes() {
        tracing::info!(
            service = %route.name(),
            prefix = %route.prefix(),
            target = %route.target(),
            strip_prefix = route.strip_prefix(),
            "Registered service"
        );
    }
    if !cors.is_enabled() {
        tracing::warn!("CORS disabled; browser clients on other origins will be refused");
    }

    let state = AppState {
        routes: Arc::new(routes),
        forwarder: Arc::new(forwarder),
        identity: Arc::new(GatewayIdentity::new(
            config.name.clone(),
            config.endpoints.health_path.clone(),
        )),
    };
    Ok(HttpServer::new(state, cors, &config.endpoints))
}

/// Bind the public listener.
pub async fn bind(listener: &ListenerConfig) -> Result<TcpListener, StartupError> {
    TcpListener::bind(&listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: listener.bind_address.clone(),
            source,
        })
}

/// Install the Prometheus exporter if enabled.
pub fn start_metrics(config: &ObservabilityConfig) -> Result<(), StartupError> {
    if !config.metrics_enabled {
        return Ok(());
    }
    let addr = config.metrics_address.parse().map_err(|_| {
        StartupError::Invalid(vec![ValidationError::MetricsAddress(
            config.metrics_address.clone(),
        )])
    })?;
    metrics::init_metrics(addr)?;
    Ok(())
}

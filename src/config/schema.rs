//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! Defaults reproduce the stock deployment: six services on localhost behind
//! a gateway on port 8000.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Human-readable gateway name, used by the health and discovery payloads.
    pub name: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Registered backend services, in matching order.
    pub services: Vec<ServiceConfig>,

    /// Default upstream timeouts.
    pub timeouts: TimeoutConfig,

    /// Outbound request shaping.
    pub forwarding: ForwardingConfig,

    /// CORS header policy.
    pub cors: CorsConfig,

    /// Gateway-owned endpoints.
    pub endpoints: EndpointConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: "API Gateway".to_string(),
            listener: ListenerConfig::default(),
            services: default_services(),
            timeouts: TimeoutConfig::default(),
            forwarding: ForwardingConfig::default(),
            cors: CorsConfig::default(),
            endpoints: EndpointConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_services() -> Vec<ServiceConfig> {
    [
        ("auth", "/auth", "http://localhost:8080"),
        ("profile", "/profile", "http://localhost:8082"),
        ("appointments", "/appointments", "http://localhost:8083"),
        ("inventory", "/inventory", "http://localhost:8084"),
        ("prescription", "/prescription", "http://localhost:8085"),
        ("video", "/video", "http://localhost:8086"),
    ]
    .into_iter()
    .map(|(name, prefix, target)| ServiceConfig::new(name, prefix, target))
    .collect()
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// A backend service reachable under a path prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Service identifier, used in logs and error bodies.
    pub name: String,

    /// Path prefix owned by this service (e.g., "/auth").
    pub path_prefix: String,

    /// Backend address, either "http://host:port" or "host:port".
    pub target: String,

    /// Remove the prefix before forwarding.
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: bool,

    /// Overrides `timeouts.connect_secs` for this service.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Overrides `timeouts.response_secs` for this service.
    #[serde(default)]
    pub response_timeout_secs: Option<u64>,
}

impl ServiceConfig {
    /// Service with default strip and timeout behaviour.
    pub fn new(
        name: impl Into<String>,
        path_prefix: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path_prefix: path_prefix.into(),
            target: target.into(),
            strip_prefix: default_strip_prefix(),
            connect_timeout_secs: None,
            response_timeout_secs: None,
        }
    }
}

fn default_strip_prefix() -> bool {
    true
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the backend to produce response headers, in seconds.
    pub response_secs: u64,

    /// Idle pooled connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            response_secs: 30,
            idle_secs: 60,
        }
    }
}

/// Outbound request shaping.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Append the client address to `X-Forwarded-For`.
    pub x_forwarded_for: bool,

    /// Maximum idle pooled connections kept per backend.
    pub pool_max_idle_per_host: usize,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            x_forwarded_for: false,
            pool_max_idle_per_host: 32,
        }
    }
}

/// CORS policy parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Attach CORS headers and answer preflights.
    pub enabled: bool,

    /// Origins allowed to read responses (exact match).
    pub allowed_origins: Vec<String>,

    /// Methods advertised in preflight responses.
    pub allowed_methods: Vec<String>,

    /// Request headers advertised in preflight responses.
    pub allowed_headers: Vec<String>,

    /// Response headers exposed to browser callers.
    pub exposed_headers: Vec<String>,

    /// Emit `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: Option<u64>,

    /// Forward `OPTIONS` requests to the backend instead of answering them.
    pub preflight_continue: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            enabled: true,
            allowed_origins: strings(&[
                "http://localhost:3000",
                "http://localhost:3001",
                "https://your-frontend-domain.com",
            ]),
            allowed_methods: strings(&["GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD"]),
            allowed_headers: strings(&[
                "Accept",
                "Authorization",
                "Content-Type",
                "X-CSRF-Token",
                "Origin",
                "X-Requested-With",
                "x-user-id",
                "x-user-role",
            ]),
            exposed_headers: strings(&["Link", "Authorization"]),
            allow_credentials: true,
            max_age_secs: Some(3600),
            preflight_continue: false,
        }
    }
}

/// Endpoints answered by the gateway itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Liveness path.
    pub health_path: String,

    /// Serve the route listing on `GET /`.
    pub discovery: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            health_path: "/health".to_string(),
            discovery: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

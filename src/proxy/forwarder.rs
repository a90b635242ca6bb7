//! Request forwarding to backend services.
//!
//! # Responsibilities
//! - Rewrite the request for the matched service (path, Host, hop headers)
//! - Send it over the service's pooled client with connect/response deadlines
//! - Classify transport failures as service unavailable
//!
//! # Design Decisions
//! - One pooled client per service; hyper's pool never hands the same
//!   connection to two in-flight requests
//! - Request and response bodies are streamed, never buffered
//! - Exactly one attempt per inbound request
//! - Dropping the returned future (client went away) drops the outbound call

use axum::body::Body;
use axum::http::{request, Request, Version};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error::{error_chain, FailureKind, GatewayError};
use crate::http::response::relay;
use crate::routing::{RouteTable, ServiceRoute};
use crate::security::headers;

/// Either the relayed backend response or a terminal failure.
pub type ProxyOutcome = Result<axum::response::Response, GatewayError>;

/// The inbound request, owned by its handler task.
#[derive(Debug)]
pub struct ProxyRequest {
    parts: request::Parts,
    body: Body,
    client_addr: Option<SocketAddr>,
}

impl ProxyRequest {
    pub fn new(request: Request<Body>, client_addr: Option<SocketAddr>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            parts,
            body,
            client_addr,
        }
    }
}

/// Pool and header settings shared by all upstream clients.
#[derive(Debug, Clone)]
pub struct ForwarderSettings {
    pub idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub x_forwarded_for: bool,
}

impl ForwarderSettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            idle_timeout: Duration::from_secs(config.timeouts.idle_secs),
            pool_max_idle_per_host: config.forwarding.pool_max_idle_per_host,
            x_forwarded_for: config.forwarding.x_forwarded_for,
        }
    }
}

impl Default for ForwarderSettings {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

#[derive(Clone)]
struct Upstream {
    client: Client<HttpConnector, Body>,
    response_timeout: Duration,
}

/// Forwards matched requests to their services.
pub struct Forwarder {
    upstreams: HashMap<String, Upstream>,
    x_forwarded_for: bool,
}

impl Forwarder {
    /// Build one pooled client per route.
    pub fn new(table: &RouteTable, settings: &ForwarderSettings) -> Self {
        let upstreams = table
            .routes()
            .iter()
            .map(|route| {
                let timeouts = route.timeouts();
                let mut connector = HttpConnector::new();
                connector.set_connect_timeout(Some(timeouts.connect));
                connector.set_nodelay(true);

                let client = Client::builder(TokioExecutor::new())
                    .pool_timer(TokioTimer::new())
                    .pool_idle_timeout(settings.idle_timeout)
                    .pool_max_idle_per_host(settings.pool_max_idle_per_host)
                    .build(connector);

                let upstream = Upstream {
                    client,
                    response_timeout: timeouts.response,
                };
                (route.name().to_string(), upstream)
            })
            .collect();

        Self {
            upstreams,
            x_forwarded_for: settings.x_forwarded_for,
        }
    }

    /// Send `request` to `route`'s backend at `forwarded_path`.
    pub async fn forward(
        &self,
        route: &ServiceRoute,
        forwarded_path: &str,
        request: ProxyRequest,
    ) -> ProxyOutcome {
        let unavailable = |kind: FailureKind, cause: String| GatewayError::BackendUnavailable {
            service: route.name().to_string(),
            kind,
            cause,
        };

        let Some(upstream) = self.upstreams.get(route.name()) else {
            return Err(unavailable(
                FailureKind::Connect,
                "no upstream client registered for service".to_string(),
            ));
        };

        let ProxyRequest {
            parts,
            body,
            client_addr,
        } = request;

        let path_and_query = match parts.uri.query() {
            Some(query) => format!("{forwarded_path}?{query}"),
            None => forwarded_path.to_string(),
        };
        let uri = route
            .target()
            .uri_for(&path_and_query)
            .map_err(|e| unavailable(FailureKind::Transport, e.to_string()))?;

        let mut outbound_headers = parts.headers;
        headers::strip_hop_by_hop(&mut outbound_headers);
        headers::rewrite_host(&mut outbound_headers, route.target().host_header());
        if self.x_forwarded_for {
            if let Some(addr) = client_addr {
                headers::append_forwarded_for(&mut outbound_headers, addr.ip());
            }
        }

        tracing::info!(
            service = %route.name(),
            method = %parts.method,
            path = %parts.uri.path(),
            upstream = %uri,
            "Forwarding request"
        );

        let mut outbound = Request::new(body);
        *outbound.method_mut() = parts.method;
        *outbound.uri_mut() = uri;
        *outbound.version_mut() = Version::HTTP_11;
        *outbound.headers_mut() = outbound_headers;

        let pending = upstream.client.request(outbound);
        match tokio::time::timeout(upstream.response_timeout, pending).await {
            Ok(Ok(response)) => Ok(relay(response)),
            Ok(Err(err)) => {
                let kind = if err.is_connect() {
                    FailureKind::Connect
                } else {
                    FailureKind::Transport
                };
                Err(unavailable(kind, error_chain(&err)))
            }
            Err(_) => Err(unavailable(
                FailureKind::Timeout,
                format!("no response from backend within {:?}", upstream.response_timeout),
            )),
        }
    }
}

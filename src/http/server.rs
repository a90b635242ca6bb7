//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with gateway endpoints and the proxy fallback
//! - Wire up middleware (request ID, tracing, CORS)
//! - Dispatch requests to the routing table
//! - Forward matched requests and turn failures into responses
//! - Serve until the shutdown signal, then drain in-flight requests

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::EndpointConfig;
use crate::error::GatewayError;
use crate::health::{self, GatewayIdentity};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics;
use crate::proxy::{Forwarder, ProxyRequest};
use crate::routing::RouteTable;
use crate::security::cors::{apply_cors, CorsPolicy};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub forwarder: Arc<Forwarder>,
    pub identity: Arc<GatewayIdentity>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    routes: Arc<RouteTable>,
}

impl HttpServer {
    /// Create a new HTTP server from prepared components.
    pub fn new(state: AppState, cors: CorsPolicy, endpoints: &EndpointConfig) -> Self {
        let routes = state.routes.clone();
        let router = Self::build_router(state, Arc::new(cors), endpoints);
        Self { router, routes }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, cors: Arc<CorsPolicy>, endpoints: &EndpointConfig) -> Router {
        let mut router: Router<AppState> = Router::new().route(
            &endpoints.health_path,
            get(health::liveness).fallback(proxy_handler),
        );
        if endpoints.discovery {
            router = router.route("/", get(health::discovery).fallback(proxy_handler));
        }

        router
            .fallback(proxy_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(cors, apply_cors))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            services = self.routes.len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Looks up the route and forwards the request.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(matched) = state.routes.match_path(&path) else {
        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "No route matched"
        );
        let status = StatusCode::NOT_FOUND.as_u16();
        metrics::record_request(method.as_str(), status, "none", start_time);
        return GatewayError::RouteNotFound { path: path.clone() }.into_response();
    };
    let route = matched.route;

    let outcome = state
        .forwarder
        .forward(route, matched.forwarded_path, ProxyRequest::new(request, client_addr))
        .await;

    match outcome {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                service = %route.name(),
                status = %response.status(),
                "Relaying backend response"
            );
            let status = response.status().as_u16();
            metrics::record_request(method.as_str(), status, route.name(), start_time);
            response
        }
        Err(err) => {
            if let GatewayError::BackendUnavailable { kind, cause, .. } = &err {
                tracing::error!(
                    request_id = %request_id,
                    service = %route.name(),
                    kind = %kind,
                    cause = %cause,
                    method = %method,
                    path = %path,
                    "Error proxying to service"
                );
                metrics::record_upstream_failure(route.name(), *kind);
            }
            let status = err.status().as_u16();
            metrics::record_request(method.as_str(), status, route.name(), start_time);
            err.into_response()
        }
    }
}

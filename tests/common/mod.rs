//! Shared utilities for gateway integration tests.

#![allow(dead_code)]

use api_gateway::config::{GatewayConfig, ServiceConfig};
use api_gateway::lifecycle::{self, Shutdown};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

/// Request header asking the echo backend to answer with a given status.
pub const ECHO_STATUS: &str = "x-echo-status";

/// A running mock backend.
pub struct Backend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl Backend {
    /// Number of requests this backend has received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Target string for a service entry.
    pub fn target(&self) -> String {
        self.addr.to_string()
    }
}

#[derive(Clone)]
struct EchoState {
    hits: Arc<AtomicUsize>,
    delay: Duration,
}

/// Describe what the backend received as JSON.
async fn echo(
    State(state): State<EchoState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let status = headers
        .get(ECHO_STATUS)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    (
        status,
        Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "host": header_str(header::HOST.as_str()),
            "forwardedFor": header_str("x-forwarded-for"),
            "body": String::from_utf8_lossy(&body),
        })),
    )
}

async fn spawn_backend(delay: Duration) -> Backend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo))
        .with_state(EchoState {
            hits: hits.clone(),
            delay,
        });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Backend { addr, hits }
}

/// Start a backend that echoes each request back as JSON.
pub async fn start_echo_backend() -> Backend {
    spawn_backend(Duration::ZERO).await
}

/// Start an echo backend that waits `delay` before answering.
pub async fn start_slow_backend(delay: Duration) -> Backend {
    spawn_backend(delay).await
}

/// Start a raw TCP backend; `handle` owns each accepted connection.
pub async fn start_raw_backend<F, Fut>(handle: F) -> SocketAddr
where
    F: Fn(TcpStream) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = Arc::new(handle);

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let handle = handle.clone();
            tokio::spawn(async move { handle(socket).await });
        }
    });
    addr
}

/// Read from `socket` until the end of an HTTP request head.
pub async fn read_request_head(socket: &mut TcpStream) -> Vec<u8> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.unwrap();
        assert!(n > 0, "connection closed before request head");
        head.extend_from_slice(&buf[..n]);
    }
    head
}

/// An address with nothing listening on it.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A running gateway on an ephemeral port.
pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Gateway configuration for `services`, listening on an ephemeral port.
pub fn config_for(services: Vec<ServiceConfig>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.services = services;
    config
}

/// Prepare, bind and run a gateway in the background.
pub async fn start_gateway(config: GatewayConfig) -> Gateway {
    let server = lifecycle::prepare(&config).unwrap();
    let listener = lifecycle::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    Gateway { addr, shutdown }
}

/// Client without connection reuse or system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

//! Per-request failures and their client-visible responses.
//!
//! Both variants are recovered at the request boundary: they become a JSON
//! response and never affect other in-flight requests.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Classification of an upstream transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection refused, DNS failure or connect timeout.
    Connect,
    /// Backend accepted the request but sent no response headers in time.
    Timeout,
    /// Connection reset or protocol error after connecting.
    Transport,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Connect => "connect",
            FailureKind::Timeout => "timeout",
            FailureKind::Transport => "transport",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal per-request failure.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("no service registered for path {path}")]
    RouteNotFound { path: String },

    #[error("{service} service unavailable ({kind}): {cause}")]
    BackendUnavailable {
        service: String,
        kind: FailureKind,
        cause: String,
    },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            GatewayError::RouteNotFound { path } => ErrorBody {
                error: "route not found".to_string(),
                message: format!("no service registered for path {path}"),
                path: Some(path.clone()),
            },
            GatewayError::BackendUnavailable { service, cause, .. } => ErrorBody {
                error: format!("{service} service unavailable"),
                message: cause.clone(),
                path: None,
            },
        }
    }
}

/// JSON shape of every gateway-generated error.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Render an error with its whole `source()` chain.
///
/// Transport errors from the HTTP client are layered ("client error
/// (Connect)" wrapping "tcp connect error" wrapping the io error); the
/// innermost cause is the useful part for callers.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        current = source.source();
    }
    rendered
}

//! CORS header policy.
//!
//! # Responsibilities
//! - Decide which CORS headers a response carries, from (origin, method)
//! - Answer `OPTIONS` preflights with 204 before routing
//! - Attach the headers to every other response, including gateway errors
//!
//! # Design Decisions
//! - Origins are matched exactly; no wildcards or patterns
//! - Disallowed or missing origins only get `Vary: Origin`
//! - Policy headers replace same-named backend headers

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use thiserror::Error;

use crate::config::CorsConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorsConfigError {
    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),

    #[error("invalid CORS method {0:?}")]
    InvalidMethod(String),

    #[error("invalid CORS header name {0:?}")]
    InvalidHeader(String),
}

/// Compiled CORS policy, shared by all requests.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    enabled: bool,
    allowed_origins: Vec<HeaderValue>,
    allow_methods: Option<HeaderValue>,
    allow_headers: Option<HeaderValue>,
    expose_headers: Option<HeaderValue>,
    allow_credentials: bool,
    max_age: Option<HeaderValue>,
    preflight_continue: bool,
}

/// Outcome of evaluating the policy for one request.
#[derive(Debug, Clone)]
pub struct CorsDecision {
    /// Headers to attach to the response.
    pub headers: HeaderMap,
    /// The gateway answers the request itself with 204.
    pub preflight: bool,
}

impl CorsPolicy {
    /// Compile and validate the configured policy.
    pub fn from_config(config: &CorsConfig) -> Result<Self, CorsConfigError> {
        let allowed_origins = config
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .ok()
                    .filter(|_| !origin.trim().is_empty())
                    .ok_or_else(|| CorsConfigError::InvalidOrigin(origin.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for method in &config.allowed_methods {
            Method::from_bytes(method.as_bytes())
                .map_err(|_| CorsConfigError::InvalidMethod(method.clone()))?;
        }
        for name in config.allowed_headers.iter().chain(&config.exposed_headers) {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| CorsConfigError::InvalidHeader(name.clone()))?;
        }

        Ok(Self {
            enabled: config.enabled,
            allowed_origins,
            allow_methods: join_list(&config.allowed_methods),
            allow_headers: join_list(&config.allowed_headers),
            expose_headers: join_list(&config.exposed_headers),
            allow_credentials: config.allow_credentials,
            max_age: config.max_age_secs.map(HeaderValue::from),
            preflight_continue: config.preflight_continue,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_origin_allowed(&self, origin: &HeaderValue) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    /// Compute the response headers for a request.
    ///
    /// `OPTIONS` requests carry the preflight headers even when they are
    /// forwarded (`preflight_continue`).
    pub fn evaluate(&self, origin: Option<&HeaderValue>, method: &Method) -> CorsDecision {
        let mut headers = HeaderMap::new();
        if !self.enabled {
            return CorsDecision {
                headers,
                preflight: false,
            };
        }

        let is_options = method == Method::OPTIONS;
        let preflight = is_options && !self.preflight_continue;
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));

        if let Some(origin) = origin.filter(|o| self.is_origin_allowed(o)) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            if self.allow_credentials {
                headers.insert(
                    header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                );
            }
            if is_options {
                let preflight_headers = [
                    (header::ACCESS_CONTROL_ALLOW_METHODS, &self.allow_methods),
                    (header::ACCESS_CONTROL_ALLOW_HEADERS, &self.allow_headers),
                    (header::ACCESS_CONTROL_MAX_AGE, &self.max_age),
                ];
                for (name, value) in preflight_headers {
                    if let Some(value) = value {
                        headers.insert(name, value.clone());
                    }
                }
            }
            if let Some(exposed) = &self.expose_headers {
                headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, exposed.clone());
            }
        }

        CorsDecision { headers, preflight }
    }
}

impl CorsDecision {
    /// Merge the decision into a response's headers.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            if *name == header::VARY {
                append_vary(target, value);
            } else {
                target.insert(name.clone(), value.clone());
            }
        }
    }
}

fn append_vary(target: &mut HeaderMap, value: &HeaderValue) {
    let wanted = value.to_str().unwrap_or_default();
    let present = target
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|v| v == "*" || v.eq_ignore_ascii_case(wanted));
    if !present {
        target.append(header::VARY, value.clone());
    }
}

fn join_list(items: &[String]) -> Option<HeaderValue> {
    if items.is_empty() {
        return None;
    }
    HeaderValue::from_str(&items.join(",")).ok()
}

/// Middleware applying the policy around the rest of the stack.
pub async fn apply_cors(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let decision = policy.evaluate(request.headers().get(header::ORIGIN), request.method());

    let mut response = if decision.preflight {
        tracing::debug!(
            path = %request.uri().path(),
            origin = ?request.headers().get(header::ORIGIN),
            "Answering CORS preflight"
        );
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    decision.apply(response.headers_mut());
    response
}

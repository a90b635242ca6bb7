//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the backend response to the client
//! - Strip hop-by-hop headers from the backend response
//!
//! # Design Decisions
//! - Streaming responses avoid buffering the entire body
//! - Status, remaining headers and body bytes pass through unmodified
//! - A body error after headers were sent aborts the client connection;
//!   the truncated transfer is the only signal the client gets

use axum::body::Body;
use axum::http::Response;
use hyper::body::Incoming;

use crate::security::headers::strip_hop_by_hop;

/// Convert a backend response into the client response.
pub fn relay(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

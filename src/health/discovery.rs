//! Route discovery endpoint.
//!
//! Informational only: lists the registered prefixes so a developer can see
//! what the gateway serves. Backend addresses are not disclosed.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discovery {
    pub message: String,
    pub version: &'static str,
    pub available_routes: Vec<RouteEntry>,
    pub health: String,
}

#[derive(Debug, Serialize)]
pub struct RouteEntry {
    pub service: String,
    pub path: String,
}

pub async fn discovery(State(state): State<AppState>) -> Json<Discovery> {
    let available_routes = state
        .routes
        .routes()
        .iter()
        .map(|route| RouteEntry {
            service: route.name().to_string(),
            path: route.prefix().to_string(),
        })
        .collect();

    Json(Discovery {
        message: state.identity.name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        available_routes,
        health: state.identity.health_path.clone(),
    })
}

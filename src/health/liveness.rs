//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::AppState;

#[derive(Debug, Serialize)]
pub struct LivenessStatus {
    pub status: String,
}

pub async fn liveness(State(state): State<AppState>) -> Json<LivenessStatus> {
    Json(LivenessStatus {
        status: format!("{} is running", state.identity.name),
    })
}

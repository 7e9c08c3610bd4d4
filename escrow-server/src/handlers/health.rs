//! Liveness endpoint for load balancers and monitoring.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

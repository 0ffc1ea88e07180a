//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::handlers::{ok, Envelope};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<Envelope<HealthResponse>> {
    let database = state.db.health_check().await;
    ok(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}

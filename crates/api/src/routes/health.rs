use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the encoder binary can be launched. Uploads still succeed
    /// without it, through the untranscoded fallback.
    pub ffmpeg_available: bool,
}

/// GET /health -- returns service and encoder health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ffmpeg_available = state.ingestor.transcoder().is_available().await;

    let status = if ffmpeg_available { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        ffmpeg_available,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

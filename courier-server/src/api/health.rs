//! Health Check API Handler

use axum::{Json, extract::State};
use courier_core::dto::system::HealthResponse;

use crate::state::AppState;

/// GET /api/health
/// Liveness plus whether a job is running
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        is_active: state.manager.is_active(),
    })
}

//! Job observation and control handlers

use axum::{Json, extract::State};
use courier_core::domain::job::JobProgress;
use courier_core::dto::job::{JobStatusView, MessageResponse};

use crate::state::AppState;

/// GET /api/progress
/// Live progress snapshot
pub async fn get_progress(State(state): State<AppState>) -> Json<JobProgress> {
    Json(state.manager.progress())
}

/// GET /api/status
/// End-of-run view of the latest job
pub async fn get_status(State(state): State<AppState>) -> Json<JobStatusView> {
    Json(JobStatusView::from(state.manager.progress()))
}

/// POST /api/stop
/// Stop the active job; a no-op when idle
pub async fn stop_process(State(state): State<AppState>) -> Json<MessageResponse> {
    tracing::info!("Stop requested over the API");
    state.manager.stop().await;

    Json(MessageResponse {
        message: "Sending process stopped".to_string(),
    })
}

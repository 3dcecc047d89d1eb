//! API Module
//!
//! HTTP API layer, mounted under `/api`.

pub mod error;
pub mod health;
pub mod job;
pub mod send;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main router with all endpoints
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let api = Router::new()
        .route("/send", post(send::send_messages))
        .route("/progress", get(job::get_progress))
        .route("/status", get(job::get_status))
        .route("/stop", post(job::stop_process))
        .route("/health", get(health::health_check));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    model: String,
    active_sessions: usize,
}

/// Health check endpoint
///
/// The service has no backing store, so it is healthy whenever it answers.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            model: state.model.clone(),
            active_sessions: state.sessions.len().await,
        }),
    )
}

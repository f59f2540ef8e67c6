//! JSON health handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::types::StatusState;

/// Health report of the monitored catalog
pub async fn health_handler(State(state): State<StatusState>) -> Response {
    match state.api.health().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            log::warn!("Health report failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to build health report: {}", e),
            )
                .into_response()
        }
    }
}

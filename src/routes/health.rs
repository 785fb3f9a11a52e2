//! Health check endpoint for blue-green rollouts.
//!
//! Unlike a bare liveness probe this checks the database round trip, so a
//! pipeline can hold traffic until the new release can reach its backend.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::state::AppState;

/// Health check handler.
///
/// 200 with build metadata when the database answers, 500 with the probe
/// error otherwise. Always responds.
pub async fn health(State(state): State<AppState>) -> Response {
    let status = state.health.check().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (code, Json(status)).into_response()
}

//! Build metadata endpoint, used to verify which release is serving.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub environment: String,
    pub deployment_id: String,
}

pub async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    let app = &state.config.app;
    Json(VersionResponse {
        version: app.version.clone(),
        environment: app.environment.clone(),
        deployment_id: app.deployment_id.clone(),
    })
}

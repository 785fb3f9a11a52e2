//! Deployment log endpoints.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::config::DEPLOYMENT_LIST_LIMIT;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::DeploymentRecord;

/// Request to record a deployment.
///
/// Both fields are optional at the JSON level so a missing field is reported
/// as a validation error rather than a decoding error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateDeploymentRequest {
    pub version: Option<String>,
    pub environment: Option<String>,
}

/// The most recent deployments, newest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<DeploymentRecord>>, AppError> {
    let records = state.store.list_recent(DEPLOYMENT_LIST_LIMIT).await?;
    tracing::debug!(count = records.len(), "Listed deployments");
    Ok(Json(records))
}

/// Append a deployment to the log and return the stored record.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateDeploymentRequest>, JsonRejection>,
) -> Result<Json<DeploymentRecord>, AppError> {
    let Json(request) = payload?;

    let record = state
        .store
        .record(
            request.version.as_deref().unwrap_or_default(),
            request.environment.as_deref().unwrap_or_default(),
        )
        .await?;

    tracing::info!(
        id = record.id,
        version = %record.version,
        environment = %record.environment,
        "Deployment recorded"
    );

    Ok(Json(record))
}

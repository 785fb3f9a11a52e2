//! Handler-boundary errors and their HTTP mapping.
//!
//! Every failure reaching a handler becomes a JSON `{"error": ...}` body. The
//! status code comes from [`AppError::status_code`] so validation and backend
//! failures stay distinguishable to clients.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request body could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// No API route matches the path.
    #[error("no route for {0}")]
    NotFound(String),

    /// The request exceeded the server's request timeout.
    #[error("request timed out")]
    Timeout,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::Validation(_)) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Store(StoreError::Database(_) | StoreError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AppError::Store(StoreError::Validation("version is required".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::BadRequest("expected JSON".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotFound("/api/unknown".into()),
                StatusCode::NOT_FOUND,
            ),
            (AppError::Timeout, StatusCode::REQUEST_TIMEOUT),
            (
                AppError::Store(StoreError::Unavailable("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error:?}");
        }
    }

    #[test]
    fn test_message_is_raw_error_text() {
        let error = AppError::Store(StoreError::Validation("version is required".into()));
        assert_eq!(error.to_string(), "version is required");

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

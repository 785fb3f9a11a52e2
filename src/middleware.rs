//! Request ID middleware for correlating logs with requests.
//!
//! Each request gets a UUID v4 and a tracing span wrapping its whole
//! lifecycle, so store and health logs emitted while handling it carry the
//! `request_id` field. The ID is echoed back in the `x-request-id` header; an
//! incoming `x-request-id` from a load balancer is reused instead of replaced.
//!
//! The timeout layer answers with a bare 408; [`timeout_error_layer`] turns it
//! into the same `{"error": ...}` body every other failure uses.

use std::time::Instant;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID, available to handlers through request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Middleware that assigns a request ID and creates a request span.
///
/// This should be the outermost layer so the span covers the timeout layer
/// and the handler.
pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();
    request.extensions_mut().insert(RequestId(request_id.clone()));

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Rewrite the empty 408 produced by the timeout layer into a JSON error.
pub async fn timeout_error_layer(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(CONTENT_TYPE)
    {
        return AppError::Timeout.into_response();
    }
    response
}

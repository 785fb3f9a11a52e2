//! HTTP route handlers.
//!
//! Routes are grouped by freshness requirements, each group carrying its own
//! Cache-Control header. Health and deployment data are never cacheable; the
//! version document is revalidated; static assets get a short public TTL.
//!
//! Every request runs inside a request-ID span and under a request timeout.
//! Unknown paths under `/api` get a JSON 404 instead of falling through to the
//! static directory.

pub mod deployments;
pub mod health;
pub mod home;
pub mod version;

use std::time::Duration;

use axum::{extract::OriginalUri, middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use http::StatusCode;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::{CACHE_CONTROL_LIVE, CACHE_CONTROL_STATIC, CACHE_CONTROL_VERSION};
use crate::error::AppError;
use crate::http::static_files::create_static_service;
use crate::middleware::{request_id_layer, timeout_error_layer};
use crate::state::AppState;

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/deployments",
            get(deployments::list).post(deployments::create),
        )
        .fallback(api_not_found);

    // Health and deployment log - always live
    let live_routes = Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_LIVE),
        ));

    let version_routes = Router::new()
        .route("/version", get(version::version))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_VERSION),
        ));

    // Landing page and anything else under the static directory
    let static_routes = Router::new()
        .route("/", get(home::index))
        .fallback_service(create_static_service(&state.config.http.static_dir))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_STATIC),
        ));

    let request_timeout = Duration::from_secs(state.config.http.request_timeout_seconds);

    Router::new()
        .merge(live_routes)
        .merge(version_routes)
        .merge(static_routes)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(timeout_error_layer))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

async fn api_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

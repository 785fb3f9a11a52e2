//! Static file serving.
//!
//! Serves the landing page assets from a directory on disk. Directory
//! requests resolve to their `index.html`.

use tower_http::services::ServeDir;

/// Create a static file service rooted at `dir`.
pub fn create_static_service(dir: &str) -> ServeDir {
    ServeDir::new(dir).append_index_html_on_directories(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_serves_files_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.css"), "body { margin: 0; }").unwrap();

        let service = create_static_service(dir.path().to_str().unwrap());
        let response = service
            .oneshot(Request::get("/app.css").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let service = create_static_service(dir.path().to_str().unwrap());
        let response = service
            .oneshot(Request::get("/missing.js").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

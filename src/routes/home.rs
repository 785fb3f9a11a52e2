//! Landing page.

use std::path::Path;

use axum::{extract::State, response::Html};

use crate::state::AppState;

/// Page served when the static directory has no `index.html`.
const BUILTIN_LANDING_PAGE: &str = include_str!("../../public/index.html");

/// Serve `<static_dir>/index.html`, falling back to the built-in page.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let path = Path::new(&state.config.http.static_dir).join("index.html");

    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Using built-in landing page");
            Html(BUILTIN_LANDING_PAGE.to_string())
        }
    }
}

//! Single-page UI
//!
//! The whole frontend is one embedded HTML page talking to the JSON
//! API. The background image is an optional display asset; when it is
//! not configured or unreadable the page falls back to a flat theme.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Optional background image; 404 triggers the page's CSS fallback
pub async fn background(State(state): State<AppState>) -> impl IntoResponse {
    let Some(path) = state.config.background_image.clone() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        Err(e) => {
            tracing::warn!("Background image unreadable ({}): {}", path, e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

use axum::{extract::Path, http::StatusCode, routing::get, Router};

use crate::state::AppState;

pub fn route_status() -> Router<AppState> {
    Router::new().route("/{code}", get(status))
}

/// Responds with the requested status code, `400` if it is not a valid one.
#[tracing::instrument]
pub async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, status.canonical_reason().unwrap_or_default().to_string()),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()),
    }
}

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn route_health() -> Router<AppState> {
    Router::new().route("/", get(health))
}

#[tracing::instrument]
pub async fn health() -> &'static str {
    "ok"
}

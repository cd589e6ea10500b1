pub mod health;
pub mod products;
pub mod root;
pub mod status;
pub mod wait;

use axum::{
    body::HttpBody,
    extract::{Request, State},
    http::{StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::state::AppState;

pub fn app_with(state: AppState) -> NormalizePath<Router<()>> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
pub fn router(state: AppState) -> Router<()> {
    Router::new()
        .route("/", get(root::root))
        .nest("/health", health::route_health())
        .nest("/status", status::route_status())
        .nest("/wait", wait::route_wait())
        .nest("/api/products", products::route_products())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), logging))
        .with_state(state)
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, format!("{} is not found", uri))
}

pub async fn logging(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let _in_flight = state.enter();
    let (method, uri) = (req.method().clone(), req.uri().clone());
    let res = next.run(req).await;
    let (status, bytes) = (res.status(), res.size_hint().lower());
    tracing::info!("{} {} {} {}", status, method, uri, bytes);
    res
}

use axum::{http::StatusCode, response::Response, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::types::ApiError;

/// Wraps the resource routers with the health probe, JSON 404s and request tracing.
pub fn app(router: Router) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(router)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

pub(crate) async fn method_not_allowed() -> Response {
    ApiError::new("Method not allowed").with_status(StatusCode::METHOD_NOT_ALLOWED)
}

async fn not_found() -> Response {
    ApiError::new("Not found").with_status(StatusCode::NOT_FOUND)
}

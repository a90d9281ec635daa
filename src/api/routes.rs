//! Router configuration

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api::products::{handlers, ProductsState};

/// Build the product API router
///
/// Bodies over `max_body_bytes` are rejected by the extractors and answered
/// with a JSON 413, whether or not the client sent a `Content-Length`.
pub fn build_router(state: ProductsState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/extract", post(handlers::extract_product))
        .route("/product", get(handlers::get_product))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::models::{
    ExtractRequest, HealthResponse, LookupKey, ProductQuery, DATA_ADDED,
};
use crate::api::error::ApiError;
use crate::products::{ProductDocument, ProductStore};
use crate::vision::LabelModel;

/// Product API state
#[derive(Clone)]
pub struct ProductsState {
    pub model: Arc<dyn LabelModel>,
    pub store: Arc<dyn ProductStore>,
    pub max_images: usize,
}

/// Health check
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Extract label data from images and store it
///
/// POST /extract
pub async fn extract_product(
    State(state): State<ProductsState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected extraction body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let links = request.into_validated_links(state.max_images).map_err(|e| {
        warn!("Extraction request rejected: {}", e);
        e
    })?;

    info!("Extraction request: {} image(s)", links.len());

    let record = state.model.extract_label(&links).await.map_err(|e| {
        error!("Label extraction failed: {}", e);
        ApiError::from(e)
    })?;

    let id = state.store.insert(&record).await.map_err(|e| {
        error!("Product insert failed: {}", e);
        ApiError::from(e)
    })?;

    info!(
        "Product stored: id={}, name={}, backend={}",
        id,
        record.product_name,
        state.store.backend_name()
    );

    Ok((
        StatusCode::OK,
        [(header::LOCATION, format!("/product?id={}", id))],
        Json(DATA_ADDED),
    ))
}

/// Look up a product by id or name
///
/// GET /product?id=... | GET /product?name=...
pub async fn get_product(
    State(state): State<ProductsState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<ProductDocument>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::Input(rejection.body_text()))?;

    let found = match query.into_lookup_key()? {
        LookupKey::Id(id) => {
            info!("Searching by id: {}", id);
            state.store.find_by_id(id).await
        }
        LookupKey::Name(name) => {
            info!("Searching by name: {}", name);
            state.store.find_by_name(&name).await
        }
    }
    .map_err(|e| {
        error!("Product lookup failed: {}", e);
        ApiError::from(e)
    })?;

    match found {
        Some(document) => {
            info!("Found product: id={}", document.id);
            Ok(Json(document))
        }
        None => {
            info!("Product not found");
            Err(ApiError::NotFound)
        }
    }
}

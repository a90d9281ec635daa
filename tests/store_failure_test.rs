//! Integration tests for store failures on both endpoints

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use label_reader::api::{build_router, ProductsState};
use label_reader::products::{ProductDocument, ProductId, ProductRecord, ProductStore, StoreError};
use label_reader::vision::{LabelModel, ModelError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Store whose every operation fails, recording how often it was asked
#[derive(Default)]
struct FailingStore {
    inserts: AtomicUsize,
    lookups: AtomicUsize,
}

#[async_trait]
impl ProductStore for FailingStore {
    async fn insert(&self, _record: &ProductRecord) -> Result<ProductId, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Serialization("cannot encode servingsPerPack".to_string()))
    }

    async fn find_by_id(&self, _id: ProductId) -> Result<Option<ProductDocument>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::InvalidDocument("document has no identifier".to_string()))
    }

    async fn find_by_name(&self, _name: &str) -> Result<Option<ProductDocument>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::InvalidDocument("document has no identifier".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

/// Model that always reads the same label
struct FixedModel {
    calls: AtomicUsize,
}

#[async_trait]
impl LabelModel for FixedModel {
    async fn extract_label(&self, _image_links: &[String]) -> Result<ProductRecord, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        serde_json::from_value(json!({
            "productName": "Choco Bar",
            "brandName": "Sweet Foods Pvt Ltd",
            "ingredients": [{"name": "Sugar", "percent": "40%", "metadata": ""}],
            "servingSize": {"quantity": 20, "unit": "g"},
            "packagingSize": {"quantity": 40, "unit": "g"},
            "servingsPerPack": 2,
            "nutritionalInformation": [],
            "fssaiLicenseNumbers": [10012345678901u64],
            "claims": [],
            "shelfLife": "9 months"
        }))
        .map_err(|e| ModelError::InvalidPayload(e.to_string()))
    }
}

fn fixed_model() -> Arc<FixedModel> {
    Arc::new(FixedModel {
        calls: AtomicUsize::new(0),
    })
}

fn router_with(model: Arc<FixedModel>, store: Arc<dyn ProductStore>) -> Router {
    let state = ProductsState {
        model,
        store,
        max_images: 10,
    };
    build_router(state, 1024 * 1024)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn extract_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image_links": ["http://x/a.jpg"]}"#))
        .unwrap()
}

fn lookup_request(query: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/product?{}", query))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_extract_insert_failure_passes_message() {
    let model = fixed_model();
    let store = Arc::new(FailingStore::default());
    let router = router_with(model.clone(), store.clone());

    let (status, body) = send(&router, extract_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Serialization error: cannot encode servingsPerPack" })
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_lookup_by_id_failure_passes_message() {
    let store = Arc::new(FailingStore::default());
    let router = router_with(fixed_model(), store.clone());

    let request = lookup_request("id=65f1c0ffee0000000000beef");
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Invalid stored document: document has no identifier" })
    );
    assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_lookup_by_name_failure_passes_message() {
    let store = Arc::new(FailingStore::default());
    let router = router_with(fixed_model(), store.clone());

    let (status, body) = send(&router, lookup_request("name=Choco+Bar")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Invalid stored document: document has no identifier");
    assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
}

//! In-process product store for local runs and tests

use super::models::*;
use super::store::{ProductStore, StoreError};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

/// Product store kept in memory, in insertion order
///
/// Name lookups return the earliest inserted match, like a MongoDB
/// `find_one` without a sort on a fresh collection.
#[derive(Default)]
pub struct InMemoryProductStore {
    documents: RwLock<IndexMap<ProductId, Map<String, Value>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, record: &ProductRecord) -> Result<ProductId, StoreError> {
        let fields = record
            .to_fields()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let id = ProductId::new();
        self.documents.write().await.insert(id, fields);

        debug!("Inserted product document in memory: id={}", id);
        Ok(id)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<ProductDocument>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&id)
            .map(|fields| ProductDocument::new(id.to_string(), fields.clone())))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ProductDocument>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|(_, fields)| fields.get("productName").and_then(Value::as_str) == Some(name))
            .map(|(id, fields)| ProductDocument::new(id.to_string(), fields.clone())))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

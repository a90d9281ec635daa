//! Product store abstraction and its MongoDB implementation

use super::models::*;
use async_trait::async_trait;
use mongodb::{
    bson::{self, doc, Bson, Document},
    Client, Collection,
};
use serde_json::Value;
use tracing::{debug, info};

/// Product store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid stored document: {0}")]
    InvalidDocument(String),
}

/// Persistence for extracted product records
///
/// Records are inserted once and never updated; lookups are single-document
/// exact matches.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a record as a new document and return its assigned identifier
    async fn insert(&self, record: &ProductRecord) -> Result<ProductId, StoreError>;

    /// Find the document with the given identifier
    async fn find_by_id(&self, id: ProductId) -> Result<Option<ProductDocument>, StoreError>;

    /// Find the first document whose `productName` equals `name` exactly
    async fn find_by_name(&self, name: &str) -> Result<Option<ProductDocument>, StoreError>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Product store configuration
#[derive(Debug, Clone)]
pub struct ProductStoreConfig {
    pub database_name: String,
    pub collection_name: String,
}

impl Default for ProductStoreConfig {
    fn default() -> Self {
        Self {
            database_name: "consumeWise".to_string(),
            collection_name: "products".to_string(),
        }
    }
}

/// MongoDB-backed product store
pub struct MongoProductStore {
    client: Client,
    collection: Collection<Document>,
    config: ProductStoreConfig,
}

impl MongoProductStore {
    /// Connect to MongoDB and verify the server is reachable
    pub async fn connect(uri: &str, config: ProductStoreConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let store = Self::new(client, config);
        store.ensure_reachable().await?;
        Ok(store)
    }

    /// Wrap an existing client; no round trip is made
    pub fn new(client: Client, config: ProductStoreConfig) -> Self {
        let collection = client
            .database(&config.database_name)
            .collection::<Document>(&config.collection_name);
        Self {
            client,
            collection,
            config,
        }
    }

    async fn ensure_reachable(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;

        info!(
            "Connected to product store: {}.{}",
            self.config.database_name, self.config.collection_name
        );
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn insert(&self, record: &ProductRecord) -> Result<ProductId, StoreError> {
        let document = bson::to_document(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let result = self.collection.insert_one(document, None).await?;
        let oid = result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::InvalidDocument(format!(
                "unexpected identifier type: {}",
                result.inserted_id
            ))
        })?;

        debug!("Inserted product document: id={}", oid);
        Ok(ProductId::from(oid))
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<ProductDocument>, StoreError> {
        let found = self
            .collection
            .find_one(doc! { "_id": id.object_id() }, None)
            .await?;
        found.map(into_product_document).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ProductDocument>, StoreError> {
        let found = self
            .collection
            .find_one(doc! { "productName": name }, None)
            .await?;
        found.map(into_product_document).transpose()
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

/// Split a raw document into its identifier and relaxed-JSON fields
fn into_product_document(mut document: Document) -> Result<ProductDocument, StoreError> {
    let id = match document.remove(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(id)) => id,
        Some(other) => other.into_relaxed_extjson().to_string(),
        None => {
            return Err(StoreError::InvalidDocument(
                "document has no identifier".to_string(),
            ))
        }
    };

    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(fields) => Ok(ProductDocument::new(id, fields)),
        other => Err(StoreError::InvalidDocument(format!(
            "document did not convert to an object: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::models::fixtures::choco_bar_payload;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = ProductStoreConfig::default();
        assert_eq!(config.database_name, "consumeWise");
        assert_eq!(config.collection_name, "products");
    }

    #[test]
    fn test_record_converts_to_bson_and_back() {
        let payload = choco_bar_payload();
        let record: ProductRecord = serde_json::from_value(payload.clone()).unwrap();

        let oid = ObjectId::new();
        let mut document = bson::to_document(&record).unwrap();
        document.insert(ID_FIELD, oid);

        let converted = into_product_document(document).unwrap();
        assert_eq!(converted.id, oid.to_hex());
        assert_eq!(Value::Object(converted.fields), payload);
    }

    #[test]
    fn test_foreign_identifiers_are_rendered_as_strings() {
        let document = doc! { "_id": "imported-42", "productName": "Choco Bar" };
        let converted = into_product_document(document).unwrap();
        assert_eq!(converted.id, "imported-42");
        assert_eq!(converted.product_name(), Some("Choco Bar"));

        let document = doc! { "_id": 42_i64, "productName": "Choco Bar" };
        assert_eq!(into_product_document(document).unwrap().id, "42");

        let rendered = serde_json::to_value(
            into_product_document(doc! { "_id": 7, "source": "csv" }).unwrap(),
        )
        .unwrap();
        assert_eq!(rendered, json!({ "_id": "7", "source": "csv" }));
    }

    #[test]
    fn test_document_without_identifier_is_rejected() {
        let document = doc! { "productName": "Choco Bar" };
        assert!(matches!(
            into_product_document(document),
            Err(StoreError::InvalidDocument(_))
        ));
    }

    // Note: These tests require a running MongoDB instance
    // They are marked as ignored by default

    #[tokio::test]
    #[ignore]
    async fn test_mongo_insert_and_find() {
        let store = MongoProductStore::connect(
            "mongodb://localhost:27017",
            ProductStoreConfig {
                database_name: "label_reader_test".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let record: ProductRecord = serde_json::from_value(choco_bar_payload()).unwrap();
        let id = store.insert(&record).await.unwrap();

        let by_id = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(by_id.product_name(), Some("Choco Bar"));

        let by_name = store.find_by_name("Choco Bar").await.unwrap();
        assert!(by_name.is_some());
    }
}

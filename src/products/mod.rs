//! Product records and their persistence
//!
//! - Typed product record matching the strict extraction schema
//! - Store-assigned identifiers and the lookup document view
//! - `ProductStore` trait with MongoDB and in-memory backends

pub mod memory;
pub mod models;
pub mod store;

pub use memory::InMemoryProductStore;
pub use models::{ProductDocument, ProductId, ProductRecord};
pub use store::{MongoProductStore, ProductStore, ProductStoreConfig, StoreError};

//! Label Reader - Library Entry Point
//!
//! Extracts structured product-label data (ingredients, nutrition facts,
//! claims, FSSAI license numbers) from package photos with a hosted
//! multimodal model and stores the result in a document database.

pub mod api;
pub mod config;
pub mod error;
pub mod products;
pub mod vision;

// Re-export commonly used types
pub use api::{build_router, ApiError, ProductsState};
pub use config::Config;
pub use error::{Error, Result};
pub use products::{ProductDocument, ProductId, ProductRecord, ProductStore};
pub use vision::{LabelModel, ModelError, OpenAiLabelClient};

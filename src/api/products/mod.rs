//! Product API endpoints
//!
//! - POST /extract - Extract label data from images and store it
//! - GET /product - Look up a stored product by id or name
//! - GET /health - Liveness check

pub mod handlers;
pub mod models;

pub use handlers::{extract_product, get_product, health_check, ProductsState};
pub use models::{ErrorBody, ExtractRequest, LookupKey, ProductQuery};

//! HTTP API for label extraction and product lookup

pub mod error;
pub mod integration;
pub mod products;
pub mod routes;

pub use error::ApiError;
pub use integration::init_products_state;
pub use products::ProductsState;
pub use routes::build_router;

//! Crate-level error type used during startup and wiring

use thiserror::Error;

use crate::products::store::StoreError;
use crate::vision::client::ModelError;
use crate::vision::prompt::SchemaError;

/// Errors raised while loading configuration and constructing services
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Model client error: {0}")]
    Model(#[from] ModelError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Wiring of configuration into the services behind the API

use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    api::products::ProductsState,
    config::{Config, StoreBackend},
    error::{Error, Result},
    products::{InMemoryProductStore, MongoProductStore, ProductStore},
    vision::{LabelModel, OpenAiLabelClient},
};

/// Initialize the model client from configuration
pub fn init_label_model(config: &Config) -> Result<Arc<dyn LabelModel>> {
    let client = OpenAiLabelClient::new(config.model.clone())?;
    info!(
        "Model client ready: model={}, endpoint={}",
        config.model.model,
        config.model.endpoint()
    );
    Ok(Arc::new(client))
}

/// Initialize the product store from configuration
pub async fn init_product_store(config: &Config) -> Result<Arc<dyn ProductStore>> {
    match config.store.backend {
        StoreBackend::Mongodb => {
            let uri = config
                .store
                .uri
                .as_ref()
                .ok_or_else(|| Error::Config("store.uri is not set (MONGODB_URI)".to_string()))?;
            let store =
                MongoProductStore::connect(uri.expose_secret(), config.store.product_store_config())
                    .await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory product store; records are lost on restart");
            Ok(Arc::new(InMemoryProductStore::new()))
        }
    }
}

/// Initialize the product API state
pub async fn init_products_state(config: &Config) -> Result<ProductsState> {
    let model = init_label_model(config)?;
    let store = init_product_store(config).await?;

    Ok(ProductsState {
        model,
        store,
        max_images: config.extraction.max_images,
    })
}

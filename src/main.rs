//! Label Reader - Main Entry Point

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use label_reader::api::{build_router, init_products_state};
use label_reader::config::{Config, LoggingConfig};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "label_reader={},tower_http={}",
            logging.level, logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    info!("Starting Label Reader v{}", env!("CARGO_PKG_VERSION"));
    info!("Store backend: {:?}", config.store.backend);
    info!("Max images per extraction: {}", config.extraction.max_images);

    let state = init_products_state(&config)
        .await
        .context("Failed to initialize services")?;

    let app = build_router(state, config.server.max_body_bytes);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Label Reader listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

//! Service configuration
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! `LABEL_READER_*` environment variables (`__` separates sections), and the
//! well-known variables `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `MONGODB_URI`
//! and `PORT`.

use crate::error::{Error, Result};
use crate::products::ProductStoreConfig;
use crate::vision::ModelConfig;
use config::{Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Default location of the optional configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/label_reader.toml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "LABEL_READER_CONFIG";

const ENV_PREFIX: &str = "LABEL_READER";

/// Well-known variables mapped onto configuration keys
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "model.api_key"),
    ("OPENAI_BASE_URL", "model.base_url"),
    ("MONGODB_URI", "store.uri"),
    ("PORT", "server.port"),
];

/// Main service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request body cap; data URLs make bodies large
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Product store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongodb,
    Memory,
}

/// Product store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// MongoDB connection string (MONGODB_URI)
    #[serde(default)]
    pub uri: Option<SecretString>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_database() -> String {
    "consumeWise".to_string()
}

fn default_collection() -> String {
    "products".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: None,
            database: default_database(),
            collection: default_collection(),
        }
    }
}

impl StoreConfig {
    pub fn product_store_config(&self) -> ProductStoreConfig {
        ProductStoreConfig {
            database_name: self.database.clone(),
            collection_name: self.collection.clone(),
        }
    }
}

/// Extraction request bounds
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Maximum image links accepted per extraction request
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

fn default_max_images() -> usize {
    10
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from a specific file (optional) and environment
    pub fn load_from(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without consulting the environment
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field requirements
    pub fn validate(&self) -> Result<()> {
        if !self.model.has_api_key() {
            return Err(Error::Config(
                "model.api_key is not set (OPENAI_API_KEY)".to_string(),
            ));
        }

        if self.store.backend == StoreBackend::Mongodb {
            let has_uri = self
                .store
                .uri
                .as_ref()
                .map_or(false, |uri| !uri.expose_secret().trim().is_empty());
            if !has_uri {
                return Err(Error::Config(
                    "store.uri is required for the mongodb backend (MONGODB_URI)".to_string(),
                ));
            }
        }

        if self.extraction.max_images == 0 {
            return Err(Error::Config(
                "extraction.max_images must be at least 1".to_string(),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(Error::Config(
                "server.max_body_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

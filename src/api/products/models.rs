//! Request and response bodies for the product API

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::products::ProductId;

/// Message for an absent or empty `image_links`
pub const NO_IMAGES_MESSAGE: &str = "No image URLs provided";

/// Message when neither lookup key is supplied
pub const NO_LOOKUP_KEY_MESSAGE: &str = "Please provide a valid product name or id";

/// Body returned by a successful extraction
pub const DATA_ADDED: &str = "data added";

/// Image URL schemes the model service accepts
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "data"];

/// Extraction request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub image_links: Option<Vec<String>>,
}

impl ExtractRequest {
    pub fn new(image_links: Vec<String>) -> Self {
        Self {
            image_links: Some(image_links),
        }
    }

    /// Check presence, count and URL form of the image links
    pub fn into_validated_links(self, max_images: usize) -> Result<Vec<String>, ApiError> {
        let links = match self.image_links {
            Some(links) if !links.is_empty() => links,
            _ => return Err(ApiError::Input(NO_IMAGES_MESSAGE.to_string())),
        };

        if links.len() > max_images {
            return Err(ApiError::Input(format!(
                "Too many image URLs: {} (maximum {})",
                links.len(),
                max_images
            )));
        }

        for (index, link) in links.iter().enumerate() {
            let valid = Url::parse(link)
                .map(|url| ALLOWED_SCHEMES.contains(&url.scheme()))
                .unwrap_or(false);
            if !valid {
                return Err(ApiError::Input(format!(
                    "Invalid image URL at position {}",
                    index
                )));
            }
        }

        Ok(links)
    }
}

/// Lookup query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Resolved lookup key
#[derive(Debug, Clone, PartialEq)]
pub enum LookupKey {
    Id(ProductId),
    Name(String),
}

impl ProductQuery {
    /// Resolve which key to search by; `id` wins over `name`, empty values
    /// count as absent
    pub fn into_lookup_key(self) -> Result<LookupKey, ApiError> {
        let id = self.id.filter(|id| !id.is_empty());
        let name = self.name.filter(|name| !name.is_empty());

        match (id, name) {
            (Some(id), _) => Ok(LookupKey::Id(id.parse()?)),
            (None, Some(name)) => Ok(LookupKey::Name(name)),
            (None, None) => Err(ApiError::Input(NO_LOOKUP_KEY_MESSAGE.to_string())),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

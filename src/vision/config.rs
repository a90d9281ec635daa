//! Configuration for the multimodal model service

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Model service client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds; unset waits indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-2024-08-06".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            timeout_secs: None,
        }
    }
}

impl ModelConfig {
    /// Chat-completions endpoint derived from the base URL
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// True when a non-empty API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .map_or(false, |key| !key.expose_secret().trim().is_empty())
    }
}

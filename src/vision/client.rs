//! Multimodal model client for label extraction

use super::config::ModelConfig;
use super::prompt::{
    response_format, validate_schema, SchemaError, LABEL_READER_PROMPT, LABEL_SCHEMA,
};
use crate::products::ProductRecord;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

/// Model client error types
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model refused the request: {0}")]
    Refusal(String),

    #[error("Malformed model reply: {0}")]
    MalformedReply(String),

    #[error("Extracted payload does not match the label schema: {0}")]
    InvalidPayload(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Model API key is not configured")]
    MissingApiKey,

    #[error("Invalid output schema: {0}")]
    InvalidSchema(#[from] SchemaError),
}

impl ModelError {
    /// True when the service answered but gave no usable label data
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, ModelError::Refusal(_) | ModelError::MalformedReply(_))
    }
}

/// Reads product labels from images
#[async_trait]
pub trait LabelModel: Send + Sync {
    /// Extract one product record from the given image locations
    async fn extract_label(&self, image_links: &[String]) -> Result<ProductRecord, ModelError>;
}

/// OpenAI chat-completions client with strict structured output
pub struct OpenAiLabelClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
    response_format: Value,
}

impl OpenAiLabelClient {
    /// Create a new client; the output schema is validated once here
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        validate_schema(&LABEL_SCHEMA)?;

        if !config.has_api_key() {
            return Err(ModelError::MissingApiKey);
        }
        let api_key = config.api_key.clone().ok_or(ModelError::MissingApiKey)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            model: config.model,
            api_key,
            response_format: response_format(&LABEL_SCHEMA),
        })
    }

    fn build_request<'a>(&'a self, image_links: &'a [String]) -> ChatRequest<'a> {
        let mut content = Vec::with_capacity(image_links.len() + 1);
        content.push(ContentPart::Text {
            text: LABEL_READER_PROMPT,
        });
        content.extend(image_links.iter().map(|url| ContentPart::ImageUrl {
            image_url: ImageUrl { url },
        }));

        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            response_format: &self.response_format,
        }
    }

    /// Call the chat-completions API
    async fn call_chat_api(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, ModelError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(e.to_string())
                } else {
                    ModelError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ModelError::UpstreamError(format!(
                "Status {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ModelError::MalformedReply(e.to_string()))
    }
}

#[async_trait]
impl LabelModel for OpenAiLabelClient {
    async fn extract_label(&self, image_links: &[String]) -> Result<ProductRecord, ModelError> {
        let start = Instant::now();
        let request = self.build_request(image_links);

        debug!(
            "Calling chat completions: model={}, images={}",
            self.model,
            image_links.len()
        );

        let reply = self.call_chat_api(&request).await?;
        let record = parse_reply(reply)?;

        debug!(
            "Label extracted in {:?}: product={}",
            start.elapsed(),
            record.product_name
        );
        Ok(record)
    }
}

/// Interpret a chat-completions reply as a product record
fn parse_reply(reply: ChatResponse) -> Result<ProductRecord, ModelError> {
    let message = reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or_else(|| ModelError::MalformedReply("reply has no message".to_string()))?;

    if let Some(refusal) = message.refusal.filter(|r| !r.is_empty()) {
        return Err(ModelError::Refusal(refusal));
    }

    let content = message
        .content
        .ok_or_else(|| ModelError::MalformedReply("message has no content".to_string()))?;

    serde_json::from_str(&content).map_err(|e| ModelError::InvalidPayload(e.to_string()))
}

// Request types for the chat-completions API
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: &'a Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

// Response types for the chat-completions API
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
    refusal: Option<String>,
}

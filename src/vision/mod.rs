//! Label extraction through a hosted multimodal model
//!
//! One blocking chat-completions call per extraction: the fixed instruction,
//! the label images, and a strict JSON schema the reply must satisfy.

pub mod client;
pub mod config;
pub mod prompt;

pub use client::{LabelModel, ModelError, OpenAiLabelClient};
pub use config::ModelConfig;
pub use prompt::{validate_schema, SchemaError, LABEL_READER_PROMPT, LABEL_SCHEMA};

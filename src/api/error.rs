//! HTTP-facing error taxonomy

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::products::models::ErrorBody;
use crate::products::models::InvalidProductId;
use crate::products::StoreError;
use crate::vision::ModelError;

/// Every failure a handler can report, with a fixed status mapping
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid request parameters
    #[error("{0}")]
    Input(String),

    /// No matching record
    #[error("Product not found")]
    NotFound,

    /// Request body over the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Model refused or replied without usable content
    #[error("Failed to extract information")]
    Extraction(#[source] ModelError),

    /// Any other failure; the message is passed through to the caller
    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Input(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Extraction(_) | ApiError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        if err.is_extraction_failure() {
            ApiError::Extraction(err)
        } else {
            ApiError::Unexpected(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::Input(rejection.body_text())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Unexpected(err.to_string())
    }
}

impl From<InvalidProductId> for ApiError {
    fn from(err: InvalidProductId) -> Self {
        ApiError::Input(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::ExtractError;
use crate::nlp::ModelError;

pub const EMPTY_EXTRACTION_MESSAGE: &str =
    "Could not extract text from the PDF. It might be a scanned image or corrupted.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only the two upload mistakes (`UnsupportedFormat`, `EmptyExtraction`) and
/// request validation get distinguished responses; every other variant is a
/// generic analysis failure carrying the underlying message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{}", EMPTY_EXTRACTION_MESSAGE)]
    EmptyExtraction,

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unsupported(msg) => AppError::UnsupportedFormat(msg),
            ExtractError::Pdf(msg) => AppError::Extraction(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::UnsupportedFormat(msg) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT", msg.clone())
            }
            AppError::EmptyExtraction => (
                StatusCode::BAD_REQUEST,
                "EMPTY_EXTRACTION",
                EMPTY_EXTRACTION_MESSAGE.to_string(),
            ),
            AppError::Extraction(_) | AppError::Model(_) | AppError::Llm(_) => {
                tracing::error!("Analysis failed: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ANALYSIS_FAILED",
                    self.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ANALYSIS_FAILED",
                    e.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

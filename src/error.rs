// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Rejected before any extractor or store call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The extractor answered, but not with usable nutrition data.
    #[error("Extraction parse error: {0}")]
    ExtractionParse(String),

    /// The extractor could not be reached or returned an HTTP error.
    #[error("Nutrition extractor error: {0}")]
    Extractor(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message shown when the user should rephrase or retake the photo.
    pub const CLARIFY_MESSAGE: &'static str =
        "We couldn't turn that into nutrition data. Please try again with a clearer description or image.";

    /// Message shown for infrastructure failures.
    pub const GENERIC_MESSAGE: &'static str = "Something went wrong. Please try again later.";

    /// True when retrying with clearer input may succeed.
    pub fn needs_clearer_input(&self) -> bool {
        matches!(self, AppError::ExtractionParse(_))
    }

    /// True for failures of the extractor or the store rather than the request.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AppError::Extractor(_) | AppError::StoreUnavailable(_) | AppError::Internal(_)
        )
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    /// Whether the same request may succeed later
    retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, details) = match &self {
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_input",
                msg.clone(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            AppError::ExtractionParse(msg) => {
                tracing::warn!(error = %msg, "Extractor output rejected");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "extraction_parse_error",
                    Self::CLARIFY_MESSAGE.to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::Extractor(msg) => {
                tracing::error!(error = %msg, "Nutrition extractor error");
                (
                    StatusCode::BAD_GATEWAY,
                    "extractor_error",
                    Self::GENERIC_MESSAGE.to_string(),
                    None,
                )
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Store error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    Self::GENERIC_MESSAGE.to_string(),
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    Self::GENERIC_MESSAGE.to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
            retryable: self.needs_clearer_input() || self.is_infrastructure(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

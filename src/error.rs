//! Error types for the Study Buddy server
//!
//! Each variant's `Display` text is the message shown to the user. Details
//! that should not reach the user are logged where the error is created.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::artifacts::ArtifactError;
use crate::extract::ExtractionError;

/// Generic message for unexpected failures
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad or missing input
    #[error("{0}")]
    Validation(String),

    /// Unreadable or empty PDF
    #[error("{0}")]
    Extraction(String),

    /// Provider failure, invalid model output, render or storage failure
    #[error("{0}")]
    Generation(String),

    /// Missing upload text or stale artifact reference
    #[error("{0}")]
    NotFound(String),

    #[error("File too large! Maximum size is {limit_mb}MB.")]
    PayloadTooLarge { limit_mb: usize },

    #[error("{}", INTERNAL_ERROR_MESSAGE)]
    Internal(String),
}

impl AppError {
    pub fn payload_too_large(limit_bytes: usize) -> Self {
        AppError::PayloadTooLarge {
            limit_mb: limit_bytes / (1024 * 1024),
        }
    }

    /// Generation failure for `what` ("study guide", "quiz")
    pub fn generation(what: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!(what, error = %err, "Generation failed");
        AppError::Generation(format!("Error generating {}: {}", what, err))
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "Internal error");
        AppError::Internal(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::Generation(_) => "GENERATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        tracing::warn!(error = %err, "PDF processing failed");
        AppError::Extraction(format!("Error processing PDF: {}", err))
    }
}

impl From<ArtifactError> for AppError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound { kind, .. } => {
                AppError::NotFound(format!("{} file not found.", kind.label()))
            }
            other => AppError::internal(other),
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        });

        (self.status_code(), body).into_response()
    }
}

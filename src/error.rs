//! Common error types for the image generation service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User already exists")]
    DuplicateEmail,

    #[error("Insufficient credits")]
    InsufficientCredits,

    #[error("Invalid prompt")]
    InvalidPrompt,

    #[error("Provider failure: {0}")]
    Provider(String),

    #[error("Upload failure: {0}")]
    Upload(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response format
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Json(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("invalid_json")),
            AppError::HttpClient(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", Some("store_failure")),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "authentication_error", Some("unauthorized")),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "authentication_error", Some("invalid_credentials")),
            AppError::DuplicateEmail => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("duplicate_email")),
            AppError::InsufficientCredits => (StatusCode::PAYMENT_REQUIRED, "billing_error", Some("insufficient_credits")),
            AppError::InvalidPrompt => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("invalid_prompt")),
            AppError::Provider(_) => (StatusCode::INTERNAL_SERVER_ERROR, "generation_error", Some("generation_failed")),
            AppError::Upload(_) => (StatusCode::INTERNAL_SERVER_ERROR, "generation_error", Some("generation_failed")),
            AppError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "rate_limit_error", Some("rate_limit_exceeded")),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
        };

        // Internal detail stays in the logs; clients get a generic message.
        let message = match &self {
            AppError::Provider(reason) | AppError::Upload(reason) => {
                error!(reason = %reason, "Generation failed");
                "Failed to generate image".to_string()
            }
            AppError::Database(e) => {
                error!(error = %e, "Store failure");
                "Internal server error".to_string()
            }
            AppError::HttpClient(e) => {
                error!(error = %e, "HTTP client failure");
                "Internal server error".to_string()
            }
            AppError::Internal(operation) => {
                error!(operation = %operation, "Internal error");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message,
                r#type: error_type.to_string(),
                code: code.map(|c| c.to_string()),
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

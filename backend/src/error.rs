//! Unified error handling for the backend API.
//!
//! Handlers return `ApiResult` and use `?` freely; this module decides the
//! HTTP status and what detail, if any, reaches the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rendezvous_shared::api::ErrorResponse;
use thiserror::Error;

use crate::providers::ProviderError;

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid or incomplete request data
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Body fields outside their allowed ranges
    #[error("Invalid request fields: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Calendar or preferences source failed
    #[error("Upstream failure: {0}")]
    Upstream(#[from] ProviderError),

    /// Server misconfiguration discovered while handling a request
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound(resource.into())
    }

    /// A required body field was absent or blank
    pub fn missing_field(field: &str) -> Self {
        ApiError::BadRequest(format!("Missing required field: {}", field))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            ApiError::BadRequest(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone(), None)
            }
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Invalid request fields".to_string(),
                Some(errors.to_string()),
            ),
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", resource),
                None,
            ),
            ApiError::Upstream(e) => {
                tracing::error!(error = ?e, "Upstream calendar failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Calendar service unavailable".to_string(),
                    None,
                )
            }
            ApiError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                    None,
                )
            }
        };

        let body = Json(match details {
            Some(details) => ErrorResponse::with_details(error_message, details),
            None => ErrorResponse::new(error_message),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

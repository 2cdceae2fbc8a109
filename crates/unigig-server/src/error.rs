//! API error type and response mapping.
//!
//! Error bodies are `{"message": ...}`, or `{"errors": [{field, message}]}`
//! for validation failures. Internal failures log the underlying error and
//! return only a generic per-route message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use unigig_core::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing request fields (400).
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// No credential presented (401).
    #[error("{0}")]
    Unauthenticated(String),

    /// Credential or session rejected (403).
    #[error("{0}")]
    InvalidCredential(String),

    /// Role mismatch (403).
    #[error("{0}")]
    Forbidden(String),

    /// Resource absent, or hidden from a non-owner (404).
    #[error("{0}")]
    NotFound(String),

    /// Duplicate registration or review (400).
    #[error("{0}")]
    Conflict(String),

    /// Unexpected store/provider failure (500). Detail is logged, not
    /// returned.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Wrap an unexpected failure with the generic message the client sees.
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            Self::Unauthenticated(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
            }
            Self::InvalidCredential(message) | Self::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(json!({ "message": message }))).into_response()
            }
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            Self::Conflict(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            Self::Internal { message, source } => {
                tracing::error!(error = ?source, "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": message })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_field_errors() {
        let err = ApiError::Validation(vec![FieldError::new("title", "Title is required")]);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_token_maps_to_401() {
        let resp = ApiError::unauthenticated("Authentication token required").into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn ownership_mismatch_maps_to_404() {
        let resp = ApiError::not_found("Gig not found or unauthorized").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_400() {
        let resp = ApiError::conflict("Review already exists for this activity").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

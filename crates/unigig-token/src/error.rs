//! Error types for credential handling.

use thiserror::Error;

/// Errors that can occur when issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The signing secret is empty or unusable. Surfaced at startup, never
    /// per-request.
    #[error("signing secret is empty")]
    EmptySecret,

    /// Failed to sign a token.
    #[error("failed to sign token: {0}")]
    SigningFailed(String),

    /// The token is past its expiry timestamp.
    #[error("token has expired")]
    Expired,

    /// Signature mismatch, malformed token, or bad claims.
    #[error("token verification failed: {0}")]
    VerificationFailed(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::VerificationFailed(e.to_string()),
        }
    }
}

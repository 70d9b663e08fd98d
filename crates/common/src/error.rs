//! Common error types shared across crates.

use thiserror::Error;

use crate::protocol::ErrorResponse;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Internal`] → 500
///
/// The display text is shown to end users verbatim, so it carries no prefix.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request could not be served as given: unknown algorithm, missing
    /// key, malformed ciphertext, mode mismatch, and so on.
    #[error("{message}")]
    BadRequest {
        /// Machine-readable error code.
        code: String,
        /// User-facing description.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Construct a [`ServiceError::BadRequest`].
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest { .. } => 400,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            ServiceError::BadRequest { code, .. } => code,
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// The JSON body sent for this error.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.code(), self.to_string())
    }
}

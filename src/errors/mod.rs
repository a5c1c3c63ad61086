//! Error types for the Document Library client.
//!
//! Two families live here. [`DocumentLibraryError`] covers faults that are
//! raised: transport failures, cancellation, invalid arguments and payloads
//! that cannot be decoded. The [`api`] module holds errors the service
//! reports, which the Result layer returns as values.

pub mod api;

pub use api::{
    ApiError, ErrorDetail, ErrorResponse, HttpProblem, InnerError, UnexpectedStatusCodeError,
    HTTP_PROBLEM_CODE, PROBLEM_JSON, UNEXPECTED_STATUS_CODE,
};

use thiserror::Error;

/// Result type alias for Document Library operations.
pub type DocumentLibraryResult<T> = Result<T, DocumentLibraryError>;

/// Faults raised by the Document Library client.
#[derive(Debug, Error)]
pub enum DocumentLibraryError {
    /// Configuration error (missing base URL, invalid header name, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// A required argument was missing or blank.
    #[error("Validation error: {message}")]
    Validation {
        /// Error message describing the validation issue.
        message: String,
    },

    /// A cloud path could not be constructed.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The rejected input.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The token provider failed to produce a bearer token.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// Request timeout.
    #[error("Request timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network/connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Any other failure below the HTTP layer.
    #[error("Transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The caller's cancellation token fired.
    #[error("Operation was cancelled")]
    Cancelled,

    /// Circuit breaker open.
    #[error("Circuit breaker open for {operation}: service temporarily unavailable")]
    CircuitOpen {
        /// The operation that was short-circuited.
        operation: String,
    },

    /// A request body could not be encoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },

    /// A success payload could not be decoded.
    #[error("Deserialization error: {message}")]
    Deserialization {
        /// Error message.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// The service answered 204 where the operation needs a value.
    #[error("{operation} returned no content")]
    MissingContent {
        /// Target name of the operation.
        operation: String,
    },

    /// The service reported an error.
    #[error("API error: {error}")]
    Api {
        /// The reported error.
        error: Box<ApiError>,
        /// The error serialized as JSON.
        payload: String,
    },
}

impl DocumentLibraryError {
    /// Returns true if this fault may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DocumentLibraryError::Timeout { .. }
                | DocumentLibraryError::Connection { .. }
                | DocumentLibraryError::Transport { .. }
        )
    }

    /// Returns true if this fault should count against a circuit breaker.
    pub fn should_circuit_break(&self) -> bool {
        matches!(
            self,
            DocumentLibraryError::Timeout { .. } | DocumentLibraryError::Connection { .. }
        )
    }

    /// Returns true if this is the cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DocumentLibraryError::Cancelled)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        DocumentLibraryError::Validation {
            message: message.into(),
        }
    }

    /// Wraps a reported API error, serializing it for diagnostics.
    pub fn api(error: ApiError) -> Self {
        let payload = error.to_json();
        DocumentLibraryError::Api {
            error: Box::new(error),
            payload,
        }
    }

    /// Returns the reported API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            DocumentLibraryError::Api { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DocumentLibraryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DocumentLibraryError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            DocumentLibraryError::Connection {
                message: err.to_string(),
            }
        } else {
            DocumentLibraryError::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for DocumentLibraryError {
    fn from(err: serde_json::Error) -> Self {
        DocumentLibraryError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for DocumentLibraryError {
    fn from(err: url::ParseError) -> Self {
        DocumentLibraryError::Configuration {
            message: format!("Invalid URL: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        assert!(DocumentLibraryError::Timeout {
            message: "test".to_string()
        }
        .is_retryable());

        assert!(DocumentLibraryError::Connection {
            message: "test".to_string()
        }
        .is_retryable());

        assert!(!DocumentLibraryError::Cancelled.is_retryable());
        assert!(!DocumentLibraryError::validation("path is required").is_retryable());
    }

    #[test]
    fn test_api_error_carries_payload() {
        let error = DocumentLibraryError::api(ApiError::from(
            ErrorDetail::new("NotFound", "No such library").with_target("libraryId"),
        ));

        match &error {
            DocumentLibraryError::Api { error, payload } => {
                assert_eq!(error.code(), "NotFound");
                assert!(payload.contains("\"target\":\"libraryId\""));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }

        assert!(error.to_string().contains("NotFound"));
        assert_eq!(error.api_error().and_then(ApiError::target), Some("libraryId"));
    }
}

// Client Error Types
use thiserror::Error;

use crate::http::TransportError;

/// Errors raised by the client core before they are folded into request state
#[derive(Debug, Error)]
pub enum ClientError {
    // No credential in the store; no request was attempted
    #[error("No bearer token set")]
    NoCredential,

    // Network failure, non-2xx status, or unreadable response
    #[error(transparent)]
    Transport(#[from] TransportError),

    // Local input checks that run before any request
    #[error("{0}")]
    Validation(String),

    // Login succeeded but the response carried no token field
    #[error("No token received from server")]
    MissingToken,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// Get error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::NoCredential => "NO_CREDENTIAL",
            ClientError::Transport(_) => "TRANSPORT_FAILURE",
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::MissingToken => "MISSING_TOKEN",
            ClientError::Storage(_) => "STORAGE_ERROR",
            ClientError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Ready-to-display message for request state.
    ///
    /// Transport failures surface the server's `detail` field verbatim when
    /// present, otherwise `fallback`. Storage and serialization problems are
    /// internal and also collapse to `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Transport(err) => err
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            ClientError::Storage(_) | ClientError::Serialization(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

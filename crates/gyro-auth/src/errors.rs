//! Relay token acquisition errors.

use thiserror::Error;

/// Why a relay token could not be obtained.
#[derive(Debug, Error)]
pub enum RelayAuthError {
    /// HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    /// Request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// Server answered with a non-success status.
    #[error("relay service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// Response body carried an `errors` field.
    #[error("relay service rejected the token: {0}")]
    Rejected(String),
    /// Response body had no usable `relay` field.
    #[error("relay service response has no relay")]
    MissingRelay,
    /// Response body was not JSON.
    #[error("failed to parse relay service response: {0}")]
    Parse(String),
}

impl RelayAuthError {
    /// Short classification string for logs.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Client(_) => "client",
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::Rejected(_) => "rejected",
            Self::MissingRelay => "missing_relay",
            Self::Parse(_) => "parse",
        }
    }
}

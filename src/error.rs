//! Error types for the Search Job client.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, SumoError>;

/// Errors returned by [`crate::api::SumoClient`]. None of them are retried.
#[derive(Error, Debug)]
pub enum SumoError {
    /// The server rejected the access credentials (HTTP 401).
    #[error("Authentication failed: check the access id/key")]
    Authentication,

    /// The server refused the job (HTTP 400) and explained why.
    #[error("Search job bad request: {code}: {message}")]
    BadRequest { code: String, message: String },

    /// Any status the endpoint does not document.
    #[error("Unexpected HTTP status code {0}")]
    UnexpectedStatus(u16),

    /// Connection, DNS, TLS or timeout failure from the HTTP stack.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body of an otherwise successful response was not the expected JSON.
    #[error("Failed to decode response body: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The configured endpoint is not a usable base URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

impl SumoError {
    /// HTTP status this error was derived from, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication => Some(401),
            Self::BadRequest { .. } => Some(400),
            Self::UnexpectedStatus(code) => Some(*code),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Deserialization(_) | Self::InvalidEndpoint(_) => None,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}

impl From<url::ParseError> for SumoError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidEndpoint(e.to_string())
    }
}

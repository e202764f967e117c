//! Error types.
//!
//! [`Error`] is returned by every fallible operation of the library.
//! Authorization failures keep their own enum, [`AuthError`], so callers can
//! tell a rejected credential apart from a broken transport.

use std::sync::Arc;

use http::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure while obtaining an access token from the authorization endpoint.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to create request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("OAuth token request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("OAuth request failed with status {}: {body}", .status.as_u16())]
    Status { status: StatusCode, body: String },

    #[error("failed to decode token response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid token response: empty access token")]
    EmptyToken,
}

/// Error type for all client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The token cache could not produce a valid bearer token.
    ///
    /// Shared so that every caller waiting on the same failed refresh
    /// receives the same error.
    #[error("authentication error: {0}")]
    Authentication(#[source] Arc<AuthError>),

    /// The API answered with a non-success status.
    #[error("gigachat error (code {}): API request failed: {message}", .status.as_u16())]
    Api { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A payload was not valid JSON for the expected type.
    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The event-stream body failed while being read.
    #[error("stream reading error: {0}")]
    Stream(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// The response was well formed but lacked something the call needs.
    #[error("gigachat error: {0}")]
    Missing(String),
}

impl From<AuthError> for Error {
    fn from(e: AuthError) -> Self {
        Error::Authentication(Arc::new(e))
    }
}

impl Error {
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Authentication(e) => match e.as_ref() {
                AuthError::Status { status, .. } => Some(*status),
                _ => None,
            },
            Error::Http(e) => e.status(),
            _ => None,
        }
    }
}

//! Outcome type for every remote call made by the desktop client.
//!
//! Transport faults, server rejections and malformed responses all end up
//! here. Callers only ever see a `RequestResult`, never a raw `reqwest` error.

use thiserror::Error;

/// Result of a single remote call. `Ok` carries the parsed payload.
pub type RequestResult<T = serde_json::Value> = Result<T, RequestError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Connection, timeout, TLS, or an unreadable/non-JSON response body.
    #[error("Runtime error")]
    Runtime,
    /// The request itself could not be built (bad URL, unserializable body).
    #[error("Logic error")]
    Logic,
    /// The server answered with a `details` field.
    #[error("{0}")]
    Rejected(String),
    /// The response parsed but had neither the expected fields nor `details`.
    #[error("Unknown error")]
    Unknown,
}

impl RequestError {
    /// Short label used as the title of error dialogs.
    pub fn category(&self) -> &'static str {
        match self {
            RequestError::Runtime => "Runtime error",
            RequestError::Logic => "Logic error",
            RequestError::Rejected(_) => "Request rejected",
            RequestError::Unknown => "Unknown error",
        }
    }

    /// Whether the failure happened below the application layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, RequestError::Runtime | RequestError::Logic)
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            RequestError::Logic
        } else {
            RequestError::Runtime
        }
    }
}

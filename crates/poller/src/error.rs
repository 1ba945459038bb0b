//! Transport error taxonomy
//!
//! Every failure to perform or interpret a status request is a
//! [`TransportError`]. The poller never surfaces these to its caller; it uses
//! [`TransportError::is_retryable`] to decide between retrying and aborting.

use thiserror::Error;

/// Failure performing or interpreting a status request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Could not reach the status endpoint
    #[error("connection failed: {0}")]
    Connect(String),

    /// No response within the allowed time
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Endpoint answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not a valid status payload
    #[error("malformed status payload: {0}")]
    Decode(String),

    /// Request could not be built (bad URL, bad scheme)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other request failure
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Whether the same request may succeed if repeated later
    ///
    /// Only requests that cannot be built are permanent. Any non-2xx answer,
    /// 4xx included, is transient: the endpoint may still be warming up.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidRequest(_))
    }

    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect(_) => "connect",
            Self::Timeout(_) => "timeout",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Request(_) => "request",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

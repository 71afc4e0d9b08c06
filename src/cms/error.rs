//! Content API error type

use thiserror::Error;

/// Errors returned by a [`ContentApi`](super::ContentApi)
#[derive(Debug, Clone, Error)]
pub enum CmsError {
    /// Connection refused, DNS failure, reset, ...
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Non-success HTTP status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape
    #[error("invalid response body: {0}")]
    Decode(String),

    /// A pagination cursor that does not point at the configured API
    #[error("cursor does not belong to this content API: {0}")]
    InvalidCursor(String),

    /// The API root did not advertise a master ref
    #[error("content API did not return a master ref")]
    MissingMasterRef,
}

impl CmsError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            CmsError::Network(_) | CmsError::Timeout(_) => true,
            CmsError::Status { status, .. } => *status >= 500 || *status == 429,
            CmsError::Decode(_) | CmsError::InvalidCursor(_) | CmsError::MissingMasterRef => false,
        }
    }
}

impl From<reqwest::Error> for CmsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CmsError::Timeout(err.to_string())
        } else if err.is_decode() {
            CmsError::Decode(err.to_string())
        } else {
            CmsError::Network(err.to_string())
        }
    }
}

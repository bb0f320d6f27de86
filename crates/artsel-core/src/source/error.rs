//! Record source errors
//!
//! Every failure to obtain a page surfaces as a `SourceError`. Callers treat
//! any of them as "fetch failed": the current operation stops and prior
//! state is left untouched.

use thiserror::Error;

/// Errors that can occur while fetching a page of records
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network or client failure (connect, timeout, TLS, body read)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body was not a valid page
    #[error("Could not decode page response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request parameters were rejected before sending
    #[error("Invalid page request: {0}")]
    InvalidRequest(String),

    /// Page could not be served (used by non-HTTP sources)
    #[error("Page {page} unavailable: {reason}")]
    Unavailable { page: usize, reason: String },
}

impl SourceError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Transport(e) => e.is_timeout() || e.is_connect(),
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            SourceError::Unavailable { .. } => true,
            SourceError::Decode(_) | SourceError::InvalidRequest(_) => false,
        }
    }
}

/// Result type for record source operations
pub type SourceResult<T> = Result<T, SourceError>;

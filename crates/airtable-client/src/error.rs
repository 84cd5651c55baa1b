//! Airtable client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AirtableError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Base or table not found")]
    NotFound,

    #[error("Request rejected: {status} - {message}")]
    InvalidRequest { status: u16, message: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AirtableError {
    /// Build from a transport error, separating out timeouts.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AirtableError::Timeout
        } else {
            AirtableError::Http(e)
        }
    }

    /// Whether the store rejected the request payload itself.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AirtableError::InvalidRequest { .. })
    }
}

//! Error types for the signup workflow.

use airtable_client::AirtableError;
use thiserror::Error;

/// Local validation failures. These never reach the record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("First name is required")]
    EmptyFirstName,

    #[error("Last name is required")]
    EmptyLastName,

    #[error("Invalid mobile number: {0}")]
    InvalidMobile(String),
}

/// Record store failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The call could not complete: timeout, transport error, bad status or
    /// a malformed response.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the payload. Not retryable without changes.
    #[error("Record store rejected request: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        StoreError::Unavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    /// Whether resubmitting unchanged input could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<AirtableError> for StoreError {
    fn from(e: AirtableError) -> Self {
        if e.is_rejection() {
            StoreError::Validation(e.to_string())
        } else {
            StoreError::Unavailable(e.to_string())
        }
    }
}

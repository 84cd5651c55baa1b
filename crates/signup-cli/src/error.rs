//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Airtable error: {0}")]
    Airtable(#[from] airtable_client::AirtableError),

    #[error("Record store not reachable")]
    StoreUnreachable,

    #[error("{0}")]
    Form(#[from] signup::FormError),

    #[error("Registration did not succeed")]
    NotRegistered,

    #[error("Sign-in did not succeed")]
    NotSignedIn,
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;

//! Airtable REST client for the signup record store.
//!
//! Only the two operations the signup flow needs are exposed: a filtered
//! single-row lookup and a single-row insert.

mod client;
mod error;
mod types;

pub use client::AirtableClient;
pub use error::AirtableError;
pub use types::*;

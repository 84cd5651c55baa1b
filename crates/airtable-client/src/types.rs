//! Request and response types for the Airtable REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field values of a row, keyed by column name.
pub type Fields = Map<String, Value>;

/// A single table row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Store-assigned row id (e.g. "recXXXXXXXXXXXXXX")
    pub id: String,

    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub fields: Fields,
}

impl Record {
    /// Read a text column, returning `None` for missing or non-string values.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// Response of a list/filter query.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Body of a single-record create request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRequest<'a> {
    pub fields: &'a Fields,
}

/// Error body returned by the API.
///
/// Airtable uses either `{"error": {"type": "...", "message": "..."}}` or a
/// bare `{"error": "NOT_FOUND"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: Option<String>,
    },
    Code(String),
}

impl ErrorBody {
    /// Human readable description of the error.
    pub fn describe(&self) -> String {
        match self {
            ErrorBody::Detailed {
                kind,
                message: Some(message),
            } => format!("{}: {}", kind, message),
            ErrorBody::Detailed { kind, message: None } => kind.clone(),
            ErrorBody::Code(code) => code.clone(),
        }
    }
}

/// Quote a value as an Airtable formula string literal.
pub fn formula_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Formula matching rows whose `field` equals `value`.
pub fn field_equals(field: &str, value: &str) -> String {
    format!("{{{}}}={}", field, formula_string(value))
}

//! Airtable HTTP client.

use crate::error::AirtableError;
use crate::types::*;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Airtable REST client scoped to a single table.
///
/// The API key is stored using `SecretString` to prevent accidental
/// exposure in logs or debug output.
#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    base_url: String,
    base_id: String,
    table: String,
    api_key: SecretString,
}

impl AirtableClient {
    /// Create a new client for `table` inside `base_id`.
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        base_id: impl Into<String>,
        table: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AirtableError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            base_id: base_id.into(),
            table: table.into(),
            api_key: SecretString::new(api_key.into()),
        })
    }

    /// Get the configured table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn table_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            encode(&self.base_id),
            encode(&self.table)
        )
    }

    /// Find the first row whose `field` equals `value`.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn find_first(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>, AirtableError> {
        let formula = field_equals(field, value);

        let response = self
            .client
            .get(self.table_url())
            .bearer_auth(self.api_key.expose_secret())
            .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")])
            .send()
            .await
            .map_err(AirtableError::from_transport)?;

        let list = self.handle_response::<ListResponse>(response).await?;
        debug!(matches = list.records.len(), "Filter query completed");

        Ok(list.records.into_iter().next())
    }

    /// Insert a single row and return it with its assigned id.
    #[instrument(skip(self, fields), fields(table = %self.table))]
    pub async fn create_record(&self, fields: &Fields) -> Result<Record, AirtableError> {
        let request = CreateRequest { fields };

        let response = self
            .client
            .post(self.table_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(AirtableError::from_transport)?;

        let record = self.handle_response::<Record>(response).await?;
        debug!(record_id = %record.id, "Record created");

        Ok(record)
    }

    /// Health check - returns true if the table can be listed.
    pub async fn health_check(&self) -> bool {
        let result = self
            .client
            .get(self.table_url())
            .bearer_auth(self.api_key.expose_secret())
            .query(&[("maxRecords", "1")])
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Airtable health check failed: {}", e);
                false
            }
        }
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AirtableError> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(AirtableError::from_transport)?;
            // Rows carry personal data; log the size only.
            debug!(bytes = body.len(), "Response received");
            serde_json::from_str(&body).map_err(AirtableError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from failed response.
    async fn extract_error(&self, response: reqwest::Response) -> AirtableError {
        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                AirtableError::RateLimit
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(status = %status, "Authentication failed");
                AirtableError::Unauthorized
            }
            StatusCode::NOT_FOUND => AirtableError::NotFound,
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorResponse>(&body)
                    .map(|e| e.error.describe())
                    .unwrap_or_else(|_| {
                        if body.is_empty() {
                            "Unknown error".into()
                        } else {
                            body
                        }
                    });

                if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY
                {
                    warn!(status = %status, message = %message, "Request rejected by store");
                    AirtableError::InvalidRequest {
                        status: status.as_u16(),
                        message,
                    }
                } else {
                    AirtableError::Api {
                        status: status.as_u16(),
                        message,
                    }
                }
            }
        }
    }
}

//! Airtable-backed user store.

use super::UserStore;
use crate::error::StoreError;
use crate::mobile::Mobile;
use crate::user::{NewUser, User, UserId, FIELD_MOBILE};
use airtable_client::AirtableClient;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Users table in an Airtable base.
///
/// Airtable has no unique constraints, so a concurrent writer in another
/// process can still insert the same mobile between our read and write.
#[derive(Clone)]
pub struct AirtableUserStore {
    client: AirtableClient,
}

impl AirtableUserStore {
    pub fn new(client: AirtableClient) -> Self {
        Self { client }
    }

    pub async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}

#[async_trait]
impl UserStore for AirtableUserStore {
    #[instrument(skip(self, mobile), fields(mobile = %mobile))]
    async fn find_by_mobile(&self, mobile: &Mobile) -> Result<Option<User>, StoreError> {
        // Lookups carry no user payload; every failure is a store fault.
        let record = self
            .client
            .find_first(FIELD_MOBILE, mobile.as_str())
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        match record {
            Some(record) => {
                debug!(record_id = %record.id, "Existing user found");
                // A stored row we cannot interpret is a bad response, not a rejection.
                User::from_record(&record)
                    .map(Some)
                    .map_err(|e| StoreError::unavailable(e.to_string()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, new_user), fields(mobile = %new_user.mobile()))]
    async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let record = self.client.create_record(&new_user.to_fields()).await?;
        debug!(record_id = %record.id, "User record created");

        // The row exists either way; fall back to what was submitted.
        match User::from_record(&record) {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(
                    record_id = %record.id,
                    error = %e,
                    "Created record could not be read back"
                );
                Ok(new_user.clone().into_user(UserId::new(record.id)))
            }
        }
    }
}

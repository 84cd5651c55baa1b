//! Record store contract and implementations.

mod airtable;
mod memory;

pub use airtable::AirtableUserStore;
pub use memory::MemoryUserStore;

use crate::error::StoreError;
use crate::mobile::Mobile;
use crate::user::{NewUser, User};
use async_trait::async_trait;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Record store holding user rows keyed by mobile number.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user registered with `mobile`. Absence is `Ok(None)`.
    async fn find_by_mobile(&self, mobile: &Mobile) -> Result<Option<User>, StoreError>;

    /// Insert a user row and return it with its assigned id.
    ///
    /// Implementations without a conditional insert do not re-check
    /// uniqueness.
    async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError>;
}

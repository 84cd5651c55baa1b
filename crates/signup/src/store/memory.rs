//! In-memory user store.

use super::UserStore;
use crate::error::StoreError;
use crate::mobile::Mobile;
use crate::user::{NewUser, User, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory users table indexed by normalized mobile.
///
/// Like the hosted store, inserts are unconditional by default: a second
/// insert for the same mobile replaces the first row. With
/// [`MemoryUserStore::with_unique_inserts`] the insert becomes conditional
/// and a duplicate is rejected.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    records: RwLock<HashMap<Mobile, User>>,
    unique_inserts: bool,
    next_id: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryUserStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose inserts fail when the mobile already exists.
    pub fn with_unique_inserts() -> Self {
        Self {
            unique_inserts: true,
            ..Self::default()
        }
    }

    /// Seed an existing row without counting it as a write.
    pub async fn insert(&self, user: User) {
        self.records.write().await.insert(user.mobile.clone(), user);
    }

    /// Get the number of stored users.
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Number of `find_by_mobile` calls served.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `create_user` calls served.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn assign_id(&self) -> UserId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        UserId::new(format!("rec{:014}", n))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_mobile(&self, mobile: &Mobile) -> Result<Option<User>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.read().await.get(mobile).cloned())
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.write().await;

        if self.unique_inserts && records.contains_key(new_user.mobile()) {
            return Err(StoreError::validation(format!(
                "mobile {} already exists",
                new_user.mobile()
            )));
        }

        let user = new_user.clone().into_user(self.assign_id());
        records.insert(user.mobile.clone(), user.clone());
        Ok(user)
    }
}

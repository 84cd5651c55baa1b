//! Authenticated session state.

use crate::user::User;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Holder of the current authenticated user.
///
/// Writes replace the whole value; the last write wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_user(&self) -> Option<User>;

    async fn set_user(&self, user: User);

    /// Sign out.
    async fn clear(&self);
}

/// Process-local session kept in memory only.
#[derive(Debug, Default)]
pub struct MemorySession {
    current: RwLock<Option<User>>,
}

impl MemorySession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySession {
    async fn get_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    async fn set_user(&self, user: User) {
        debug!(user_id = %user.id, "Session user set");
        *self.current.write().await = Some(user);
    }

    async fn clear(&self) {
        if self.current.write().await.take().is_some() {
            debug!("Session cleared");
        }
    }
}

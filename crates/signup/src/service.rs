//! Registration service: uniqueness check, record creation, session commit.

use crate::error::{InputError, StoreError};
use crate::mobile::{CountryCode, Mobile};
use crate::session::SessionStore;
use crate::store::UserStore;
use crate::user::{NewUser, User};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, instrument, warn};

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new account was created and is now the session user.
    Created(User),
    /// An account with this mobile already exists. Nothing was written.
    DuplicateMobile,
    /// Input was rejected locally. The store was not contacted.
    InvalidInput(InputError),
    /// The store failed. The session is unchanged.
    Failed(StoreError),
}

impl RegistrationOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, RegistrationOutcome::Created(_))
    }
}

/// Result of signing in with an existing mobile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn(User),
    UnknownMobile,
    InvalidInput(InputError),
    Failed(StoreError),
}

/// Serializes work per normalized mobile within this process.
#[derive(Default)]
struct MobileLocks {
    locks: Mutex<HashMap<Mobile, Arc<Mutex<()>>>>,
}

impl MobileLocks {
    async fn acquire(&self, mobile: &Mobile) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Drop entries nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(mobile.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Orchestrates account registration against a record store and commits the
/// result to the session.
pub struct RegistrationService {
    store: Arc<dyn UserStore>,
    session: Arc<dyn SessionStore>,
    default_country: Option<CountryCode>,
    locks: MobileLocks,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn UserStore>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            session,
            default_country: None,
            locks: MobileLocks::default(),
        }
    }

    /// Accept national mobiles (no leading `+`) as numbers in `country`.
    pub fn with_default_country(mut self, country: CountryCode) -> Self {
        self.default_country = Some(country);
        self
    }

    /// Register a new account.
    ///
    /// Performs at most one lookup and one insert, never retries, and only
    /// touches the session on `Created`.
    #[instrument(skip(self, first_name, last_name))]
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        mobile: &str,
    ) -> RegistrationOutcome {
        let new_user = match NewUser::parse_with_default_country(
            first_name,
            last_name,
            mobile,
            self.default_country.as_ref(),
        ) {
            Ok(new_user) => new_user,
            Err(e) => {
                info!(reason = %e, "Registration input rejected");
                return RegistrationOutcome::InvalidInput(e);
            }
        };

        // Held until the session commit so a concurrent attempt for the same
        // mobile observes our write.
        let _guard = self.locks.acquire(new_user.mobile()).await;

        match self.store.find_by_mobile(new_user.mobile()).await {
            Ok(Some(existing)) => {
                info!(mobile = %new_user.mobile(), user_id = %existing.id, "Mobile already registered");
                return RegistrationOutcome::DuplicateMobile;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(mobile = %new_user.mobile(), error = %e, "Uniqueness check failed");
                return RegistrationOutcome::Failed(e);
            }
        }

        let user = match self.store.create_user(&new_user).await {
            Ok(user) => user,
            Err(e) => {
                warn!(mobile = %new_user.mobile(), error = %e, "User creation failed");
                return RegistrationOutcome::Failed(e);
            }
        };

        self.session.set_user(user.clone()).await;
        info!(mobile = %user.mobile, user_id = %user.id, "User registered");

        RegistrationOutcome::Created(user)
    }

    /// Sign in as the existing account for `mobile`.
    #[instrument(skip(self))]
    pub async fn sign_in(&self, mobile: &str) -> SignInOutcome {
        let mobile =
            match Mobile::parse_with_default_country(mobile, self.default_country.as_ref()) {
                Ok(mobile) => mobile,
                Err(e) => return SignInOutcome::InvalidInput(e),
            };

        match self.store.find_by_mobile(&mobile).await {
            Ok(Some(user)) => {
                self.session.set_user(user.clone()).await;
                info!(mobile = %mobile, user_id = %user.id, "User signed in");
                SignInOutcome::SignedIn(user)
            }
            Ok(None) => {
                info!(mobile = %mobile, "No account for mobile");
                SignInOutcome::UnknownMobile
            }
            Err(e) => {
                warn!(mobile = %mobile, error = %e, "Sign-in lookup failed");
                SignInOutcome::Failed(e)
            }
        }
    }

    /// Clear the session.
    pub async fn sign_out(&self) {
        self.session.clear().await;
    }
}

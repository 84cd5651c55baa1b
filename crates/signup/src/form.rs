//! Signup form controller.
//!
//! Collects field input, drives the registration service and turns its
//! outcome into a notification plus an optional navigation target.

use crate::service::{RegistrationOutcome, RegistrationService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const SUBMIT_LABEL: &str = "Sign Up";
pub const SUBMITTING_LABEL: &str = "Creating account...";

/// Navigation targets reachable from the signup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Landing view shown after signing up.
    Home,
    Login,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
        }
    }
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Destructive,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    fn error(description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Destructive,
            title: "Error".into(),
            description: description.into(),
        }
    }
}

/// What the form shows after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormResponse {
    pub notice: Notice,
    pub navigate_to: Option<Route>,
    pub outcome: RegistrationOutcome,
}

impl From<RegistrationOutcome> for FormResponse {
    fn from(outcome: RegistrationOutcome) -> Self {
        let (notice, navigate_to) = match &outcome {
            RegistrationOutcome::Created(_) => (
                Notice::success(
                    "Welcome to MySitterSquad!",
                    "Your account has been created successfully.",
                ),
                Some(Route::Home),
            ),
            RegistrationOutcome::DuplicateMobile => (
                Notice::error("A user with this mobile number already exists."),
                None,
            ),
            RegistrationOutcome::InvalidInput(reason) => (Notice::error(reason.to_string()), None),
            RegistrationOutcome::Failed(_) => (
                Notice::error("Failed to create account. Please try again."),
                None,
            ),
        };

        Self {
            notice,
            navigate_to,
            outcome,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("A submission is already in progress")]
    Busy,
}

/// Raw field values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SignupFields {
    first_name: String,
    last_name: String,
    mobile: String,
}

/// Resets the loading flag when dropped, whatever the outcome.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Controller behind the signup form.
pub struct SignupForm {
    service: Arc<RegistrationService>,
    fields: SignupFields,
    loading: AtomicBool,
}

impl SignupForm {
    pub fn new(service: Arc<RegistrationService>) -> Self {
        Self {
            service,
            fields: SignupFields::default(),
            loading: AtomicBool::new(false),
        }
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.fields.first_name = value.into();
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.fields.last_name = value.into();
    }

    /// A cleared phone input arrives as `None`.
    pub fn set_mobile(&mut self, value: Option<String>) {
        self.fields.mobile = value.unwrap_or_default();
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_loading() {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Target of the "Already have an account?" link.
    pub fn login_route(&self) -> Route {
        Route::Login
    }

    /// Submit the form. Rejected with [`FormError::Busy`] while a previous
    /// submission is still in flight.
    pub async fn submit(&self) -> Result<FormResponse, FormError> {
        if self.loading.swap(true, Ordering::SeqCst) {
            debug!("Submission ignored, another is in flight");
            return Err(FormError::Busy);
        }
        let _loading = LoadingGuard(&self.loading);

        let outcome = self
            .service
            .register(
                &self.fields.first_name,
                &self.fields.last_name,
                &self.fields.mobile,
            )
            .await;

        Ok(FormResponse::from(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InputError, StoreError};
    use crate::session::MemorySession;
    use crate::mobile::Mobile;
    use crate::store::{MemoryUserStore, MockUserStore, UserStore};
    use crate::user::{NewUser, User, UserId};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Holds the lookup open until released.
    #[derive(Default)]
    struct GatedStore {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl UserStore for GatedStore {
        async fn find_by_mobile(&self, _mobile: &Mobile) -> Result<Option<User>, StoreError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(None)
        }

        async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
            Ok(new_user.clone().into_user(UserId::new("recGated")))
        }
    }

    fn form_with(store: Arc<dyn UserStore>) -> SignupForm {
        let service = RegistrationService::new(store, Arc::new(MemorySession::new()));
        let mut form = SignupForm::new(Arc::new(service));
        form.set_first_name("Ada");
        form.set_last_name("Lovelace");
        form.set_mobile(Some("+15551234567".into()));
        form
    }

    #[tokio::test]
    async fn test_created_navigates_home() {
        let form = form_with(Arc::new(MemoryUserStore::new()));

        let response = form.submit().await.unwrap();

        assert_eq!(response.navigate_to, Some(Route::Home));
        assert_eq!(response.notice.kind, NoticeKind::Success);
        assert_eq!(response.notice.title, "Welcome to MySitterSquad!");
        assert!(response.outcome.is_created());
        assert!(!form.is_loading());
    }

    #[tokio::test]
    async fn test_duplicate_message() {
        let store = MemoryUserStore::new();
        store
            .insert(
                NewUser::parse("Ada", "Lovelace", "+15551234567")
                    .unwrap()
                    .into_user(UserId::new("recAda")),
            )
            .await;
        let form = form_with(Arc::new(store));

        let response = form.submit().await.unwrap();

        assert_eq!(response.navigate_to, None);
        assert_eq!(response.notice.kind, NoticeKind::Destructive);
        assert_eq!(
            response.notice.description,
            "A user with this mobile number already exists."
        );
    }

    #[tokio::test]
    async fn test_failure_message_and_loading_reset() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_mobile()
            .returning(|_| Err(StoreError::unavailable("timed out")));
        let form = form_with(Arc::new(store));

        let response = form.submit().await.unwrap();

        assert_eq!(
            response.notice.description,
            "Failed to create account. Please try again."
        );
        assert_eq!(response.notice.title, "Error");
        assert!(!form.is_loading());
        assert_eq!(form.submit_label(), SUBMIT_LABEL);
    }

    #[tokio::test]
    async fn test_invalid_input_message() {
        let mut form = form_with(Arc::new(MemoryUserStore::new()));
        form.set_mobile(None);

        let response = form.submit().await.unwrap();

        assert!(matches!(
            response.outcome,
            RegistrationOutcome::InvalidInput(InputError::InvalidMobile(_))
        ));
        assert!(response.notice.description.starts_with("Invalid mobile number"));
    }

    #[tokio::test]
    async fn test_busy_while_in_flight() {
        let store = Arc::new(GatedStore::default());
        let form = Arc::new(form_with(store.clone()));

        let first = tokio::spawn({
            let form = form.clone();
            async move { form.submit().await }
        });
        store.entered.notified().await;

        assert!(form.is_loading());
        assert_eq!(form.submit_label(), SUBMITTING_LABEL);
        assert_eq!(form.submit().await, Err(FormError::Busy));
        // The rejected submission leaves the first one in flight.
        assert!(form.is_loading());

        store.release.notify_one();
        let response = first.await.unwrap().unwrap();

        assert!(response.outcome.is_created());
        assert!(!form.is_loading());
        assert_eq!(form.submit_label(), SUBMIT_LABEL);
    }

    #[test]
    fn test_routes() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Login.path(), "/login");
    }
}

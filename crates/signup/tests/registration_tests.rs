//! End-to-end registration scenarios against in-memory and HTTP-backed stores.

use async_trait::async_trait;
use signup::{
    AirtableUserStore, MemorySession, MemoryUserStore, Mobile, NewUser, RegistrationOutcome,
    RegistrationService, SessionStore, StoreError, User, UserStore,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a service over a fresh in-memory store and session.
fn create_test_service(
    store: Arc<MemoryUserStore>,
) -> (RegistrationService, Arc<MemorySession>) {
    let session = Arc::new(MemorySession::new());
    let service = RegistrationService::new(store, session.clone());
    (service, session)
}

/// Store that can be switched offline, wrapping an in-memory store.
struct FlakyStore {
    inner: MemoryUserStore,
    offline: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryUserStore::new(),
            offline: AtomicBool::new(false),
        }
    }

    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for FlakyStore {
    async fn find_by_mobile(&self, mobile: &Mobile) -> Result<Option<User>, StoreError> {
        self.check()?;
        self.inner.find_by_mobile(mobile).await
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        self.check()?;
        self.inner.create_user(new_user).await
    }
}

#[tokio::test]
async fn test_register_on_empty_store() {
    let store = Arc::new(MemoryUserStore::new());
    let (service, session) = create_test_service(store.clone());

    let outcome = service.register("Ada", "Lovelace", "+15551234567").await;

    let user = match outcome {
        RegistrationOutcome::Created(user) => user,
        other => panic!("expected Created, got {:?}", other),
    };
    assert!(!user.id.as_str().is_empty());
    assert_eq!(user.first_name, "Ada");
    assert_eq!(user.last_name, "Lovelace");
    assert_eq!(user.mobile.as_str(), "+15551234567");
    assert_eq!(session.get_user().await, Some(user));
    assert_eq!(store.reads(), 1);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_register_twice_same_mobile() {
    let store = Arc::new(MemoryUserStore::new());
    let (service, session) = create_test_service(store.clone());

    let first = service.register("Ada", "Lovelace", "+15551234567").await;
    assert!(first.is_created());
    let after_first = session.get_user().await;

    // Same number, typed differently
    let second = service.register("Augusta", "King", "+1 555-123-4567").await;
    assert_eq!(second, RegistrationOutcome::DuplicateMobile);
    assert_eq!(session.get_user().await, after_first);
    assert_eq!(store.count().await, 1);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_invalid_input_makes_no_store_calls() {
    let store = Arc::new(MemoryUserStore::new());
    let (service, session) = create_test_service(store.clone());

    let outcome = service.register("Ada", "Lovelace", "not a number").await;

    assert!(matches!(outcome, RegistrationOutcome::InvalidInput(_)));
    assert_eq!(store.reads(), 0);
    assert_eq!(store.writes(), 0);
    assert!(session.get_user().await.is_none());
}

#[tokio::test]
async fn test_recovery_after_outage() {
    let store = Arc::new(FlakyStore::new());
    let session = Arc::new(MemorySession::new());
    let service = RegistrationService::new(store.clone(), session.clone());

    store.set_offline(true);
    let failed = service.register("Ada", "Lovelace", "+15551234567").await;
    assert!(matches!(
        failed,
        RegistrationOutcome::Failed(StoreError::Unavailable(_))
    ));
    assert!(session.get_user().await.is_none());
    assert_eq!(store.inner.count().await, 0);

    store.set_offline(false);
    let recovered = service.register("Ada", "Lovelace", "+15551234567").await;
    assert!(recovered.is_created());
    assert_eq!(store.inner.count().await, 1);
}

#[tokio::test]
async fn test_concurrent_same_mobile_creates_once() {
    let store = Arc::new(MemoryUserStore::new());
    let (service, _session) = create_test_service(store.clone());
    let service = Arc::new(service);

    let attempts = (0..8).map(|_| {
        let service = service.clone();
        async move { service.register("Ada", "Lovelace", "+15551234567").await }
    });
    let outcomes = futures::future::join_all(attempts).await;

    let created = outcomes.iter().filter(|o| o.is_created()).count();
    let duplicates = outcomes
        .iter()
        .filter(|o| **o == RegistrationOutcome::DuplicateMobile)
        .count();

    assert_eq!(created, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_unique_insert_surfaces_as_failure() {
    // Simulates a write from another process landing between our read and
    // write: the row exists only once the insert runs.
    struct RacingStore {
        inner: MemoryUserStore,
    }

    #[async_trait]
    impl UserStore for RacingStore {
        async fn find_by_mobile(&self, _mobile: &Mobile) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
            self.inner.create_user(new_user).await
        }
    }

    let inner = MemoryUserStore::with_unique_inserts();
    inner
        .create_user(&NewUser::parse("Other", "Writer", "+15551234567").unwrap())
        .await
        .unwrap();

    let session = Arc::new(MemorySession::new());
    let service = RegistrationService::new(Arc::new(RacingStore { inner }), session.clone());

    let outcome = service.register("Ada", "Lovelace", "+15551234567").await;
    assert!(matches!(
        outcome,
        RegistrationOutcome::Failed(StoreError::Validation(_))
    ));
    assert!(session.get_user().await.is_none());
}

#[tokio::test]
async fn test_register_against_http_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appTest/Users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "records": [] })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/appTest/Users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "recAda",
            "createdTime": "2024-01-01T00:00:00.000Z",
            "fields": {
                "First Name": "Ada",
                "Last Name": "Lovelace",
                "Mobile": "+15551234567"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = airtable_client::AirtableClient::new(
        "test-api-key",
        mock_server.uri(),
        "appTest",
        "Users",
        Duration::from_secs(5),
    )
    .unwrap();
    let session = Arc::new(MemorySession::new());
    let service = RegistrationService::new(
        Arc::new(AirtableUserStore::new(client)),
        session.clone(),
    );

    let outcome = service.register("Ada", "Lovelace", "+15551234567").await;

    match outcome {
        RegistrationOutcome::Created(user) => {
            assert_eq!(user.id.as_str(), "recAda");
            assert_eq!(session.get_user().await, Some(user));
        }
        other => panic!("expected Created, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_find_outage_skips_create() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appTest/Users"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/appTest/Users"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = airtable_client::AirtableClient::new(
        "test-api-key",
        mock_server.uri(),
        "appTest",
        "Users",
        Duration::from_secs(5),
    )
    .unwrap();
    let service = RegistrationService::new(
        Arc::new(AirtableUserStore::new(client)),
        Arc::new(MemorySession::new()),
    );

    let outcome = service.register("Ada", "Lovelace", "+15551234567").await;
    assert!(matches!(
        outcome,
        RegistrationOutcome::Failed(StoreError::Unavailable(_))
    ));
}

//! Tests for the session store.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MemoryTokenStore, MockAuthGateway};
use crate::domain::{ErrorCode, UserId};

fn profile(is_active: bool) -> UserProfile {
    UserProfile {
        id: UserId::new(1),
        email: "ada@example.org".to_owned(),
        is_active,
        is_superuser: false,
    }
}

fn token(raw: &str) -> AccessToken {
    AccessToken::new(raw).expect("token")
}

#[fixture]
fn tokens() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::default())
}

#[rstest]
fn construction_reports_loading_only_with_persisted_token(tokens: Arc<MemoryTokenStore>) {
    let store = SessionStore::new(Arc::new(MockAuthGateway::new()), tokens);
    assert!(!store.is_loading());

    let persisted = Arc::new(MemoryTokenStore::with_token(token("stored")));
    let store = SessionStore::new(Arc::new(MockAuthGateway::new()), persisted);
    assert!(store.is_loading());
}

#[rstest]
#[tokio::test]
async fn login_persists_token_and_loads_profile(tokens: Arc<MemoryTokenStore>) {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .times(1)
        .return_once(|_| Ok(AccessToken::new("issued").expect("token")));
    gateway
        .expect_current_user()
        .times(1)
        .withf(|token| token.expose() == "issued")
        .return_once(|_| Ok(profile(true)));

    let mut store = SessionStore::new(Arc::new(gateway), tokens.clone());
    store
        .login("ada@example.org", "hunter2")
        .await
        .expect("login succeeds");

    assert!(store.is_authenticated());
    assert_eq!(store.session().map(Session::email), Some("ada@example.org"));
    let persisted = tokens.load().expect("load").expect("token persisted");
    assert_eq!(persisted.expose(), "issued");
}

#[rstest]
#[tokio::test]
async fn login_validates_input_before_calling_server(tokens: Arc<MemoryTokenStore>) {
    let mut gateway = MockAuthGateway::new();
    gateway.expect_login().times(0);

    let mut store = SessionStore::new(Arc::new(gateway), tokens);
    let error = store.login("not-an-email", "pw").await.expect_err("invalid");

    assert_eq!(
        error,
        SessionError::InvalidInput(CredentialsValidationError::MalformedEmail)
    );
}

#[rstest]
#[case(AuthGatewayError::invalid_credentials(), SessionError::InvalidCredentials)]
#[case(
    AuthGatewayError::rejected("Email already registered"),
    SessionError::Rejected { reason: "Email already registered".to_owned() }
)]
#[case(
    AuthGatewayError::transport("connection refused"),
    SessionError::Network { message: "connection refused".to_owned() }
)]
#[tokio::test]
async fn login_maps_gateway_failures(
    tokens: Arc<MemoryTokenStore>,
    #[case] failure: AuthGatewayError,
    #[case] expected: SessionError,
) {
    let mut gateway = MockAuthGateway::new();
    gateway.expect_login().return_once(move |_| Err(failure));

    let mut store = SessionStore::new(Arc::new(gateway), tokens.clone());
    let error = store
        .login("ada@example.org", "pw")
        .await
        .expect_err("login fails");

    assert_eq!(error, expected);
    assert!(!store.is_authenticated());
    assert!(tokens.load().expect("load").is_none());
}

#[rstest]
#[tokio::test]
async fn login_refuses_inactive_accounts(tokens: Arc<MemoryTokenStore>) {
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_login()
        .return_once(|_| Ok(AccessToken::new("issued").expect("token")));
    gateway
        .expect_current_user()
        .return_once(|_| Ok(profile(false)));

    let mut store = SessionStore::new(Arc::new(gateway), tokens.clone());
    let error = store
        .login("ada@example.org", "pw")
        .await
        .expect_err("inactive");

    assert_eq!(error, SessionError::Inactive);
    assert!(tokens.load().expect("load").is_none());
}

#[rstest]
#[tokio::test]
async fn register_signs_in_afterwards(tokens: Arc<MemoryTokenStore>) {
    let mut gateway = MockAuthGateway::new();
    gateway.expect_register().times(1).return_once(|_| Ok(()));
    gateway
        .expect_login()
        .times(1)
        .return_once(|_| Ok(AccessToken::new("issued").expect("token")));
    gateway
        .expect_current_user()
        .times(1)
        .return_once(|_| Ok(profile(true)));

    let mut store = SessionStore::new(Arc::new(gateway), tokens);
    store
        .register("ada@example.org", "pw")
        .await
        .expect("register succeeds");

    assert!(store.is_authenticated());
}

#[rstest]
#[tokio::test]
async fn restore_accepts_valid_token() {
    let tokens = Arc::new(MemoryTokenStore::with_token(token("stored")));
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_current_user()
        .withf(|token| token.expose() == "stored")
        .return_once(|_| Ok(profile(true)));

    let mut store = SessionStore::new(Arc::new(gateway), tokens);
    assert!(store.is_loading());
    store.restore().await.expect("restore");

    assert!(!store.is_loading());
    assert_eq!(store.token().map(AccessToken::expose), Some("stored"));
}

#[rstest]
#[case(AuthGatewayError::unauthorized())]
#[case(AuthGatewayError::transport("timeout"))]
#[tokio::test]
async fn restore_failure_logs_out(#[case] failure: AuthGatewayError) {
    let tokens = Arc::new(MemoryTokenStore::with_token(token("stale")));
    let mut gateway = MockAuthGateway::new();
    gateway
        .expect_current_user()
        .return_once(move |_| Err(failure));

    let mut store = SessionStore::new(Arc::new(gateway), tokens.clone());
    store.restore().await.expect("restore completes");

    assert!(!store.is_authenticated());
    assert!(!store.is_loading());
    assert!(tokens.load().expect("load").is_none());
}

#[rstest]
#[tokio::test]
async fn restore_without_token_skips_validation(tokens: Arc<MemoryTokenStore>) {
    let mut gateway = MockAuthGateway::new();
    gateway.expect_current_user().times(0);

    let mut store = SessionStore::new(Arc::new(gateway), tokens);
    store.restore().await.expect("restore");
    assert!(!store.is_authenticated());
}

#[rstest]
fn logout_is_idempotent() {
    let tokens = Arc::new(MemoryTokenStore::with_token(token("stored")));
    let mut store = SessionStore::new(Arc::new(MockAuthGateway::new()), tokens.clone());

    store.logout();
    store.logout();
    store.force_logout("token rejected");

    assert!(!store.is_authenticated());
    assert!(tokens.load().expect("load").is_none());
}

#[rstest]
#[case(SessionError::InvalidCredentials, ErrorCode::Unauthorized)]
#[case(SessionError::Inactive, ErrorCode::Forbidden)]
#[case(SessionError::Network { message: "down".to_owned() }, ErrorCode::Network)]
#[case(SessionError::Storage { message: "denied".to_owned() }, ErrorCode::Internal)]
fn session_errors_map_to_domain_codes(#[case] error: SessionError, #[case] code: ErrorCode) {
    assert_eq!(Error::from(error).code(), code);
}

//! End-to-end tests of the login page against a fake authentication server.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use campus_console::store::keys;
use campus_console::{
    AuthClient, Credentials, FailureKind, FileStore, KeyValueStore, LoginPage, LoginState,
    MemoryStore, SessionStore, require_finance,
};
use campus_console_core::{RedirectResolver, RedirectSource, build_session};
use campus_console_integration_tests::{
    FakeAuthServer, FakeResponse, login_page, unreachable_login_url,
};
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};

fn credentials() -> Credentials {
    Credentials::new("asha", "correct horse".to_string())
}

fn stores() -> (MemoryStore, MemoryStore) {
    (MemoryStore::new(), MemoryStore::new())
}

async fn rejected(response: FakeResponse) -> (FailureKind, String, MemoryStore, MemoryStore) {
    let server = FakeAuthServer::start(response).await;
    let (durable, tab) = stores();
    let mut page = server.login_page(&durable, &tab);
    page.mount();

    let error = match page.submit(&credentials()).await {
        LoginState::AnonymousForm { error: Some(error) } => error.clone(),
        state => panic!("expected the form with an error, got {state:?}"),
    };
    (error.kind, error.message, durable, tab)
}

// ============================================================================
// Successful logins
// ============================================================================

#[tokio::test]
async fn test_finance_login() {
    let server = FakeAuthServer::start(FakeResponse::ok(json!({
        "roles": ["fin_act"],
        "user_role": "Finance",
        "username": "u1",
    })))
    .await;
    let (durable, tab) = stores();
    let mut page = server.login_page(&durable, &tab);

    assert_eq!(page.mount(), &LoginState::AnonymousForm { error: None });
    let target = page.submit(&credentials()).await.target().cloned().unwrap();
    assert_eq!(target.path, "/finance/dashboard");
    assert_eq!(target.source, RedirectSource::FinanceRole);

    let record: Value = serde_json::from_str(&durable.get(keys::AUTH).unwrap().unwrap()).unwrap();
    assert_eq!(record["user_role"], "Finance");
    assert_eq!(record["userId"], "u1");
    assert_eq!(record["isAuthenticated"], true);
    assert_eq!(tab.get(keys::HIDE_CHARTS).unwrap().as_deref(), Some("false"));
    assert_eq!(
        tab.get(keys::GROUP_MODE).unwrap().as_deref(),
        Some("single_college")
    );

    assert_eq!(
        server.requests(),
        vec![json!({"username": "asha", "password": "correct horse"})]
    );

    assert_eq!(page.navigate(), Some(target));
    assert_eq!(require_finance(page.store()).unwrap().user_id, "u1");
}

#[tokio::test]
async fn test_student_login() {
    let server = FakeAuthServer::start(FakeResponse::ok(json!({"roles": ["stu_curr"]}))).await;
    let (durable, tab) = stores();
    let mut page = server.login_page(&durable, &tab);
    page.mount();

    let target = page.submit(&credentials()).await.target().cloned().unwrap();
    assert_eq!(target.path, "/dashboard");
    assert_eq!(target.source, RedirectSource::Default);
    assert_eq!(tab.get(keys::HIDE_CHARTS).unwrap().as_deref(), Some("true"));
    assert!(durable.get(keys::AUTH).unwrap().is_some());

    // Without an identifier the session is not reusable on the next visit.
    assert!(!page.store().is_valid());
}

#[tokio::test]
async fn test_group_admin_login_writes_mirrors() {
    let server = FakeAuthServer::start(FakeResponse::ok(json!({
        "userId": 42,
        "roles": "grp_adm, teacher",
        "group_id": "G-7",
        "college_id": "C-1",
        "college_code": "ENG",
    })))
    .await;
    let (durable, tab) = stores();
    let mut page = server.login_page(&durable, &tab);
    page.mount();
    page.submit(&credentials()).await;

    let mirror = |key| tab.get(key).unwrap();
    assert_eq!(mirror(keys::GROUP_MODE).as_deref(), Some("group_of_institute"));
    assert_eq!(mirror(keys::IS_GROUP_ADMIN).as_deref(), Some("true"));
    assert_eq!(mirror(keys::CHILD_USER_ROLE).as_deref(), Some("grp_mgmt_usr"));
    assert_eq!(mirror(keys::ACTIVE_GROUP_ID).as_deref(), Some("G-7"));
    assert_eq!(mirror(keys::ACTIVE_COLLEGE_ID).as_deref(), Some("C-1"));
    assert_eq!(mirror(keys::COLLEGE_CODE).as_deref(), Some("ENG"));
    assert_eq!(page.store().load().unwrap().user_id, "42");
}

#[tokio::test]
async fn test_login_with_file_stores() {
    let server = FakeAuthServer::start(FakeResponse::ok(json!({
        "user_id": "t9",
        "roles": ["teacher"],
        "teacher_id": "T-9",
    })))
    .await;
    let root = std::env::temp_dir()
        .join("campus-console-tests")
        .join(uuid::Uuid::new_v4().to_string());
    let durable = FileStore::new(root.join("durable"));
    let tab = FileStore::new(root.join("tab"));

    let mut page = LoginPage::new(
        AuthClient::new(server.login_url().clone()).unwrap(),
        SessionStore::new(durable.clone(), tab.clone()),
        RedirectResolver::default(),
    );
    page.mount();
    page.submit(&credentials()).await;

    // A fresh page over the same directories picks the session up.
    let reopened = SessionStore::new(durable, tab);
    let session = reopened.load().unwrap();
    assert_eq!(session.user_id, "t9");
    assert_eq!(session.teacher_id.as_deref(), Some("T-9"));

    std::fs::remove_dir_all(root).unwrap();
}

// ============================================================================
// Redirect precedence
// ============================================================================

#[tokio::test]
async fn test_body_redirect_beats_header() {
    let server = FakeAuthServer::start(
        FakeResponse::ok(json!({
            "username": "u1",
            "roles": ["fin_act"],
            "redirect_url": "/fees/overview",
        }))
        .with_redirect_header("/from-header"),
    )
    .await;
    let (durable, tab) = stores();
    let mut page = server.login_page(&durable, &tab);

    let target = page.submit(&credentials()).await.target().cloned().unwrap();
    assert_eq!(target.path, "/fees/overview");
    assert_eq!(target.source, RedirectSource::ResponseBody);
}

#[tokio::test]
async fn test_header_redirect_beats_finance_role() {
    let server = FakeAuthServer::start(
        FakeResponse::ok(json!({"username": "u1", "roles": ["fin_act"], "redirect_url": ""}))
            .with_redirect_header("/from-header"),
    )
    .await;
    let (durable, tab) = stores();
    let mut page = server.login_page(&durable, &tab);

    let target = page.submit(&credentials()).await.target().cloned().unwrap();
    assert_eq!(target.path, "/from-header");
    assert_eq!(target.source, RedirectSource::ResponseHeader);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_invalid_credentials() {
    let (kind, message, durable, tab) =
        rejected(FakeResponse::json(StatusCode::UNAUTHORIZED, json!({"message": "nope"}))).await;
    assert_eq!(kind, FailureKind::InvalidCredentials);
    assert_eq!(message, "Invalid username or password.");
    assert!(durable.is_empty() && tab.is_empty());
}

#[tokio::test]
async fn test_access_denied() {
    let (kind, message, durable, tab) = rejected(FakeResponse::empty(StatusCode::FORBIDDEN)).await;
    assert_eq!(kind, FailureKind::AccessDenied);
    assert_eq!(
        message,
        "Access denied. Your account is not allowed to sign in to this console."
    );
    assert!(durable.is_empty() && tab.is_empty());
}

#[tokio::test]
async fn test_server_error_with_message() {
    let (kind, message, durable, tab) = rejected(FakeResponse::json(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"message": "Database maintenance until 6pm"}),
    ))
    .await;
    assert_eq!(kind, FailureKind::ServerError);
    assert_eq!(message, "Database maintenance until 6pm");
    assert!(durable.is_empty() && tab.is_empty());
}

#[tokio::test]
async fn test_server_error_falls_back_to_error_field() {
    let (_, message, _, _) = rejected(FakeResponse::json(
        StatusCode::BAD_REQUEST,
        json!({"error": "Account locked"}),
    ))
    .await;
    assert_eq!(message, "Account locked");
}

#[tokio::test]
async fn test_server_error_without_message() {
    let (kind, message, durable, tab) =
        rejected(FakeResponse::text(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")).await;
    assert_eq!(kind, FailureKind::ServerError);
    assert_eq!(message, "Something went wrong on the server. Please try again.");
    assert!(durable.is_empty() && tab.is_empty());
}

#[tokio::test]
async fn test_unreachable_server() {
    let (durable, tab) = stores();
    let mut page = login_page(unreachable_login_url().await, &durable, &tab);
    page.mount();

    let error = page.submit(&credentials()).await.error().cloned().unwrap();
    assert_eq!(error.kind, FailureKind::NetworkError);
    assert_eq!(
        error.message,
        "Unable to reach the server. Please try again later."
    );
    assert!(durable.is_empty() && tab.is_empty());
}

#[tokio::test]
async fn test_empty_roles_are_rejected() {
    let (kind, message, durable, tab) =
        rejected(FakeResponse::ok(json!({"username": "u1", "roles": []}))).await;
    assert_eq!(kind, FailureKind::InvalidResponse);
    assert_eq!(message, "Login failed. Please try again.");
    assert!(durable.is_empty() && tab.is_empty());
}

#[tokio::test]
async fn test_non_json_success_is_rejected() {
    let (kind, message, durable, _) =
        rejected(FakeResponse::text(StatusCode::OK, "welcome!")).await;
    assert_eq!(kind, FailureKind::InvalidResponse);
    assert_eq!(message, "Login failed. Please try again.");
    assert!(durable.is_empty());
}

#[tokio::test]
async fn test_failed_login_keeps_previous_session() {
    let server = FakeAuthServer::start(FakeResponse::empty(StatusCode::UNAUTHORIZED)).await;
    let (durable, tab) = stores();
    let store = SessionStore::new(durable.clone(), tab.clone());
    store
        .save(&build_session(&json!({"username": "u1", "roles": ["hr"]}), Utc::now()).unwrap())
        .unwrap();

    let mut page = server.login_page(&durable, &tab);
    page.submit(&credentials()).await;
    assert_eq!(store.load().unwrap().user_id, "u1");
}

// ============================================================================
// Mount
// ============================================================================

#[tokio::test]
async fn test_mount_with_valid_session_skips_form() {
    let server = FakeAuthServer::start(FakeResponse::empty(StatusCode::UNAUTHORIZED)).await;
    let (durable, tab) = stores();
    SessionStore::new(durable.clone(), tab.clone())
        .save(
            &build_session(
                &json!({"username": "u1", "roles": ["staff"], "user_role": "finance_admin"}),
                Utc::now() - TimeDelta::hours(23),
            )
            .unwrap(),
        )
        .unwrap();

    let mut page = server.login_page(&durable, &tab);
    let state = page.mount().clone();
    assert!(matches!(
        state,
        LoginState::RedirectPending { ref target } if target.path == "/finance/dashboard"
    ));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_mount_with_expired_session_clears_stores() {
    let (durable, tab) = stores();
    SessionStore::new(durable.clone(), tab.clone())
        .save(
            &build_session(
                &json!({"username": "u1", "roles": ["teacher"]}),
                Utc::now() - TimeDelta::hours(25),
            )
            .unwrap(),
        )
        .unwrap();
    assert!(!durable.is_empty());

    let mut page = login_page(unreachable_login_url().await, &durable, &tab);
    assert_eq!(page.mount(), &LoginState::AnonymousForm { error: None });
    assert!(durable.is_empty());
    assert!(tab.is_empty());
}

#[tokio::test]
async fn test_new_login_replaces_previous_session() {
    let (durable, tab) = stores();
    SessionStore::new(durable.clone(), tab.clone())
        .save(
            &build_session(
                &json!({"username": "old", "roles": ["grp_adm"], "group_id": "G-1"}),
                Utc::now(),
            )
            .unwrap(),
        )
        .unwrap();

    let server = FakeAuthServer::start(FakeResponse::ok(json!({
        "username": "new",
        "roles": ["teacher"],
    })))
    .await;
    let mut page = server.login_page(&durable, &tab);
    page.submit(&credentials()).await;

    assert_eq!(page.store().load().unwrap().user_id, "new");
    assert_eq!(tab.get(keys::ACTIVE_GROUP_ID).unwrap(), None);
    assert_eq!(tab.get(keys::CHILD_USER_ROLE).unwrap(), None);
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle tests: startup check, login, OAuth callback, logout.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use skillshare_client::services::OAuthProvider;
use skillshare_client::session::{OAuthMessage, SessionState};
use skillshare_client::storage::CredentialStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

mod common;
use common::{closed_port_url, spawn_backend, test_client, Hits};

const APP_ORIGIN: &str = "http://localhost:5173";

fn sarah() -> Value {
    json!({
        "id": 1,
        "name": "Sarah Miller",
        "username": "sarahmiller",
        "email": "sarah@example.com"
    })
}

/// Backend that knows one user, reachable with token `tok-1`.
fn backend(logout_hits: Arc<Hits>) -> Router {
    Router::new()
        .route(
            "/auth/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "secret" {
                    Json(json!({
                        "success": true,
                        "token": "tok-1",
                        "refreshToken": "ref-1",
                        "user": sarah()
                    }))
                    .into_response()
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "success": false, "message": "Invalid credentials" })),
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/auth/register",
            post(|Json(body): Json<Value>| async move {
                if body["email"] == "sarah@example.com" {
                    (
                        StatusCode::CONFLICT,
                        Json(json!({
                            "success": false,
                            "message": "User with this email already exists"
                        })),
                    )
                        .into_response()
                } else {
                    Json(json!({
                        "success": true,
                        "token": "tok-1",
                        "user": sarah()
                    }))
                    .into_response()
                }
            }),
        )
        .route(
            "/auth/logout",
            post(move || async move {
                logout_hits.bump();
                StatusCode::OK
            }),
        )
        .route(
            "/users/me",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok());
                if auth == Some("Bearer tok-1") {
                    Json(sarah()).into_response()
                } else {
                    StatusCode::NOT_FOUND.into_response()
                }
            }),
        )
}

#[tokio::test]
async fn test_login_then_logout() {
    let logout_hits = Arc::new(Hits::default());
    let base = spawn_backend(backend(logout_hits.clone())).await;
    let t = test_client(&base, false);
    let session = &t.client.session;

    let outcome = session
        .login_with_credentials("sarah@example.com", "secret")
        .await;

    assert!(outcome.success, "{:?}", outcome.error);
    assert!(!session.is_loading());
    let user = session.user().expect("user after login");
    assert_eq!(user.id, "1");
    assert_eq!(t.store.get("authToken").unwrap().as_deref(), Some("tok-1"));
    assert_eq!(t.store.get("refreshToken").unwrap().as_deref(), Some("ref-1"));
    assert_eq!(t.store.get("userId").unwrap().as_deref(), Some("1"));

    session.logout().await;

    assert_eq!(logout_hits.get(), 1);
    assert_eq!(session.user(), None);
    assert!(!session.is_authenticated());
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn test_rejected_credentials_are_not_an_error() {
    let base = spawn_backend(backend(Arc::new(Hits::default()))).await;
    let t = test_client(&base, false);

    let outcome = t
        .client
        .session
        .login_with_credentials("sarah@example.com", "wrong")
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Invalid credentials"));
    assert_eq!(t.client.session.snapshot().state, SessionState::Unauthenticated);
    assert!(!t.client.session.is_loading());
    assert_eq!(t.store.get("authToken").unwrap(), None);
    // Login failures must not trigger the forced-logout redirect
    assert_eq!(t.navigator.redirects(), 0);
}

#[tokio::test]
async fn test_malformed_email_fails_before_request() {
    let base = closed_port_url().await;
    let t = test_client(&base, false);

    let outcome = t
        .client
        .session
        .login_with_credentials("not-an-email", "secret")
        .await;

    assert!(!outcome.success);
    let error = outcome.error.unwrap();
    assert!(error.starts_with("Login failed:"), "{}", error);
    assert!(!error.contains("Network"), "{}", error);
}

#[tokio::test]
async fn test_check_auth_without_token() {
    let base = closed_port_url().await;
    let t = test_client(&base, false);
    assert!(t.client.session.is_loading());

    t.client.session.check_auth().await;

    let snapshot = t.client.session.snapshot();
    assert_eq!(snapshot.state, SessionState::Unauthenticated);
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn test_check_auth_restores_session() {
    let base = spawn_backend(backend(Arc::new(Hits::default()))).await;
    let t = test_client(&base, false);
    t.store.set("authToken", "tok-1").unwrap();

    t.client.session.check_auth().await;

    assert_eq!(t.client.session.user().map(|u| u.name), Some("Sarah Miller".to_string()));
    assert!(!t.client.session.is_loading());
    assert_eq!(t.store.get("userId").unwrap().as_deref(), Some("1"));
}

#[tokio::test]
async fn test_check_auth_with_unknown_token_invalidates() {
    let base = spawn_backend(backend(Arc::new(Hits::default()))).await;
    let t = test_client(&base, false);
    t.store.set("authToken", "tok-unknown").unwrap();
    t.store.set("userId", "42").unwrap();
    t.store.set("refreshToken", "ref-1").unwrap();

    t.client.session.check_auth().await;

    let snapshot = t.client.session.snapshot();
    assert_eq!(snapshot.state, SessionState::Invalid);
    assert!(!snapshot.loading);
    assert_eq!(t.store.get("authToken").unwrap(), None);
    assert_eq!(t.store.get("userId").unwrap(), None);
    assert_eq!(t.store.get("refreshToken").unwrap().as_deref(), Some("ref-1"));
}

#[tokio::test]
async fn test_callback_authenticates() {
    let base = spawn_backend(backend(Arc::new(Hits::default()))).await;
    let t = test_client(&base, false);

    t.client
        .session
        .handle_auth_callback("tok-1", Some("1"))
        .await;

    let snapshot = t.client.session.snapshot();
    assert!(matches!(snapshot.state, SessionState::Authenticated(ref u) if u.id == "1"));
    assert!(!snapshot.loading);
    assert_eq!(t.store.get("authToken").unwrap().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn test_callback_keeps_token_when_profile_fails() {
    let router = Router::new().route(
        "/users/me",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = spawn_backend(router).await;
    let t = test_client(&base, false);

    t.client
        .session
        .handle_auth_callback("tok-1", Some("u1"))
        .await;

    let snapshot = t.client.session.snapshot();
    assert_eq!(
        snapshot.state,
        SessionState::Resolving {
            user_id: Some("u1".to_string())
        }
    );
    assert!(snapshot.is_authenticated());
    assert!(!snapshot.loading);
    assert_eq!(t.store.get("authToken").unwrap().as_deref(), Some("tok-1"));
    assert_eq!(t.store.get("userId").unwrap().as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_callback_with_empty_token_is_ignored() {
    let base = closed_port_url().await;
    let t = test_client(&base, false);
    let before = t.client.session.snapshot();

    t.client.session.handle_auth_callback("", Some("u1")).await;

    assert_eq!(t.client.session.snapshot(), before);
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn test_foreign_origin_message_is_dropped() {
    let base = spawn_backend(backend(Arc::new(Hits::default()))).await;
    let t = test_client(&base, false);
    let before = t.client.session.snapshot();

    t.client
        .session
        .dispatch_message(OAuthMessage::callback("http://evil.example", "tok-1"))
        .await;

    assert_eq!(t.client.session.snapshot(), before);
    assert_eq!(t.store.get("authToken").unwrap(), None);
}

#[tokio::test]
async fn test_listen_dispatches_same_origin_messages() {
    let base = spawn_backend(backend(Arc::new(Hits::default()))).await;
    let t = test_client(&base, false);
    let mut states = t.client.session.subscribe();
    let (tx, rx) = mpsc::channel(4);

    tx.send(
        OAuthMessage::from_json(
            "http://evil.example",
            r#"{"type":"oauth_callback","token":"tok-evil"}"#,
        )
        .unwrap(),
    )
    .await
    .unwrap();
    tx.send(
        OAuthMessage::from_json(
            APP_ORIGIN,
            r#"{"type":"oauth_callback","token":"tok-1","userId":"1"}"#,
        )
        .unwrap(),
    )
    .await
    .unwrap();
    drop(tx);

    t.client.session.listen(rx).await;

    assert!(states.has_changed().unwrap());
    assert_eq!(t.client.session.user().map(|u| u.id), Some("1".to_string()));
    assert_eq!(t.store.get("authToken").unwrap().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn test_oauth_login_url() {
    let base = closed_port_url().await;
    let t = test_client(&base, false);

    let url = t.client.session.login(OAuthProvider::Github);

    assert_eq!(url, format!("{}/oauth2/authorization/github", base));
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_is_down() {
    let base = closed_port_url().await;
    let t = test_client(&base, false);
    t.store.set("authToken", "tok-1").unwrap();
    t.store.set("refreshToken", "ref-1").unwrap();

    t.client.session.logout().await;

    assert!(t.store.is_empty());
    assert_eq!(t.client.session.snapshot().state, SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_start_runs_startup_check() {
    use skillshare_client::config::ClientConfig;
    use skillshare_client::storage::MemoryStore;
    use skillshare_client::SkillShareClient;

    let base = spawn_backend(backend(Arc::new(Hits::default()))).await;
    let store = Arc::new(MemoryStore::new());
    store.set("authToken", "tok-1").unwrap();

    let client = SkillShareClient::start(
        ClientConfig::test_default(&base),
        store,
        Arc::new(common::RecordingNavigator::default()),
    )
    .await
    .unwrap();

    assert!(!client.session.is_loading());
    assert_eq!(client.session.user().map(|u| u.id), Some("1".to_string()));
}

#[tokio::test]
async fn test_register_logs_in() {
    let base = spawn_backend(backend(Arc::new(Hits::default()))).await;
    let t = test_client(&base, false);

    let outcome = t
        .client
        .session
        .register("Sam Lee", "sam@example.com", "secret")
        .await;

    assert!(outcome.success, "{:?}", outcome.error);
    assert!(t.client.session.user().is_some());
    assert!(!t.client.session.is_loading());
    assert_eq!(t.store.get("authToken").unwrap().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn test_register_duplicate_email_reports_backend_message() {
    let base = spawn_backend(backend(Arc::new(Hits::default()))).await;
    let t = test_client(&base, false);

    let outcome = t
        .client
        .session
        .register("Sarah Miller", "sarah@example.com", "secret")
        .await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.error.as_deref(),
        Some("User with this email already exists")
    );
    assert_eq!(t.client.session.snapshot().state, SessionState::Unauthenticated);
    assert_eq!(t.store.get("authToken").unwrap(), None);
}

#[tokio::test]
async fn test_logout_does_not_wait_for_unresponsive_backend() {
    let seen_auth = Arc::new(Mutex::new(None::<String>));
    let router = Router::new().route(
        "/auth/logout",
        post({
            let seen_auth = seen_auth.clone();
            move |headers: HeaderMap| async move {
                *seen_auth.lock().unwrap() = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                tokio::time::sleep(Duration::from_secs(3600)).await;
                StatusCode::OK
            }
        }),
    );
    let base = spawn_backend(router).await;
    let t = test_client(&base, false);
    t.store.set("authToken", "tok-1").unwrap();
    t.store.set("refreshToken", "ref-1").unwrap();

    let finished =
        tokio::time::timeout(Duration::from_secs(10), t.client.session.logout()).await;

    assert!(finished.is_ok(), "logout blocked on the backend");
    assert!(t.store.is_empty());
    assert_eq!(t.client.session.snapshot().state, SessionState::Unauthenticated);
    // The backend still learns which session ended
    assert_eq!(seen_auth.lock().unwrap().as_deref(), Some("Bearer tok-1"));
}

#[tokio::test]
async fn test_callback_with_rejected_token_invalidates() {
    let router = Router::new().route("/users/me", get(|| async { StatusCode::UNAUTHORIZED }));
    let base = spawn_backend(router).await;
    let t = test_client(&base, false);

    t.client
        .session
        .handle_auth_callback("tok-1", Some("u1"))
        .await;

    let snapshot = t.client.session.snapshot();
    assert_eq!(snapshot.state, SessionState::Invalid);
    assert!(!snapshot.is_authenticated());
    assert!(!snapshot.loading);
    assert_eq!(t.store.get("authToken").unwrap(), None);
    assert_eq!(t.navigator.redirects(), 1);
}

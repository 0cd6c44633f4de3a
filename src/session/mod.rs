// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: the single source of truth for "is a user logged in".
//!
//! Handles:
//! - Startup auth check against the stored token
//! - Credential login and registration
//! - OAuth callbacks (directly or via same-origin popup messages)
//! - Logout
//!
//! State is published through a `watch` channel so hosts can re-render on
//! every change.

pub mod message;
pub mod state;

pub use message::{OAuthMessage, OAuthPayload};
pub use state::{LoginOutcome, Session, SessionState};

use crate::models::User;
use crate::services::{AuthClient, AuthResponse, OAuthProvider, UserClient};
use crate::storage::Credentials;
use message::same_origin;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Upper bound on waiting for the backend to acknowledge a logout.
pub const LOGOUT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(2);

pub struct SessionStore {
    auth: AuthClient,
    users: UserClient,
    credentials: Credentials,
    app_origin: String,
    state: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new(
        auth: AuthClient,
        users: UserClient,
        credentials: Credentials,
        app_origin: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(Session::initial());
        Self {
            auth,
            users,
            credentials,
            app_origin: app_origin.into(),
            state,
        }
    }

    // ─── Observation ─────────────────────────────────────────────────────────

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    fn update(&self, f: impl FnOnce(&mut Session)) {
        self.state.send_modify(f);
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// Resolve the stored token into a session. Run once at startup.
    ///
    /// A token the backend has no profile for (or that fails to resolve at
    /// all) is purged and the session marked `Invalid`.
    pub async fn check_auth(&self) {
        if !self.credentials.has_token() {
            tracing::debug!("No token found, user not authenticated");
            self.update(|s| {
                s.state = SessionState::Unauthenticated;
                s.loading = false;
            });
            return;
        }

        let user_id = self.credentials.user_id().ok().flatten();
        self.update(|s| {
            s.state = SessionState::Resolving { user_id };
            s.loading = true;
        });

        tracing::debug!("Token found, loading user profile");
        match self.users.current().await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.id, "Session restored");
                self.remember(&user);
                self.update(|s| {
                    s.state = SessionState::Authenticated(user);
                    s.loading = false;
                });
            }
            Ok(None) => {
                tracing::warn!("No user data returned despite stored token, clearing token");
                self.invalidate();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to check authentication, clearing token");
                self.invalidate();
            }
        }
    }

    /// Log in with email and password. Never returns an error; failures are
    /// reported in the outcome.
    pub async fn login_with_credentials(&self, email: &str, password: &str) -> LoginOutcome {
        self.update(|s| s.loading = true);

        let outcome = match self.auth.login(email, password).await {
            Ok(response) => self.accept(response),
            Err(e) => {
                tracing::warn!(error = %e, "Error during credential login");
                LoginOutcome::failed(format!("Login failed: {}", e))
            }
        };

        self.update(|s| s.loading = false);
        outcome
    }

    /// Register a new account and log in as it.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> LoginOutcome {
        self.update(|s| s.loading = true);

        let outcome = match self.auth.register(name, email, password).await {
            Ok(response) => self.accept(response),
            Err(e) => {
                tracing::warn!(error = %e, "Error during registration");
                LoginOutcome::failed(format!("Registration failed: {}", e))
            }
        };

        self.update(|s| s.loading = false);
        outcome
    }

    /// Start an OAuth flow. Returns the URL the host must open; the result
    /// arrives later as an [`OAuthMessage`].
    pub fn login(&self, provider: OAuthProvider) -> String {
        let url = self.auth.oauth_url(provider);
        tracing::info!(provider = %provider, url = %url, "Starting OAuth login");
        url
    }

    /// Store a token delivered by the OAuth flow and resolve its profile.
    ///
    /// The session becomes `Resolving` immediately so protected views can
    /// render. Profile failures are logged and swallowed and the token is
    /// kept, unless the gateway purged it, in which case the session ends
    /// `Invalid`.
    pub async fn handle_auth_callback(&self, token: &str, user_id: Option<&str>) {
        if token.is_empty() {
            tracing::warn!("Auth callback without token, ignoring");
            return;
        }

        tracing::info!(has_user_id = user_id.is_some(), "Auth callback received");

        if let Err(e) = self.credentials.set_token(token) {
            tracing::error!(error = %e, "Failed to persist token");
        }
        if let Some(id) = user_id {
            if let Err(e) = self.credentials.set_user_id(id) {
                tracing::warn!(error = %e, "Failed to persist user id");
            }
        }

        self.update(|s| {
            if !matches!(s.state, SessionState::Authenticated(_)) {
                s.state = SessionState::Resolving {
                    user_id: user_id.map(str::to_string),
                };
            }
        });

        match self.users.current().await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.id, "User profile loaded");
                self.remember(&user);
                self.update(|s| s.state = SessionState::Authenticated(user));
            }
            Ok(None) => tracing::warn!("Profile unavailable after auth callback"),
            Err(e) => tracing::warn!(error = %e, "Failed to load profile after auth callback"),
        }

        // The gateway purges credentials when the token is rejected outright
        if !self.credentials.has_token() {
            tracing::warn!("Token was rejected while loading profile");
            self.invalidate();
            return;
        }

        self.update(|s| s.loading = false);
    }

    /// End the session.
    ///
    /// Local state is cleared first. The backend is then told about the
    /// logout, waiting at most [`LOGOUT_NOTIFY_TIMEOUT`] for an answer.
    pub async fn logout(&self) {
        tracing::info!("Logging out user");

        let token = self.credentials.token().ok().flatten();
        if let Err(e) = self.credentials.clear() {
            tracing::warn!(error = %e, "Failed to clear stored credentials");
        }
        self.update(|s| {
            s.state = SessionState::Unauthenticated;
            s.loading = false;
        });

        match tokio::time::timeout(LOGOUT_NOTIFY_TIMEOUT, self.auth.logout(token.as_deref())).await
        {
            Ok(Ok(())) => tracing::debug!("Backend acknowledged logout"),
            Ok(Err(e)) => tracing::debug!(error = %e, "Backend logout failed"),
            Err(_) => tracing::debug!("Backend logout timed out"),
        }
    }

    // ─── OAuth popup messages ────────────────────────────────────────────────

    /// Handle one cross-window message. Messages from any origin other than
    /// the application's own are dropped without touching the session.
    pub async fn dispatch_message(&self, message: OAuthMessage) {
        if !same_origin(&message.origin, &self.app_origin) {
            tracing::warn!(origin = %message.origin, "Ignoring message from foreign origin");
            return;
        }

        match message.payload {
            OAuthPayload::OAuthCallback {
                token: Some(token),
                user_id,
                ..
            } => {
                self.handle_auth_callback(&token, user_id.as_deref())
                    .await
            }
            OAuthPayload::OAuthCallback {
                error: Some(error), ..
            } => tracing::error!(error = %error, "OAuth error"),
            OAuthPayload::OAuthCallback { .. } => {
                tracing::debug!("OAuth callback without token or error")
            }
            OAuthPayload::Other => {}
        }
    }

    /// Dispatch messages until the sender side closes.
    pub async fn listen(&self, mut messages: mpsc::Receiver<OAuthMessage>) {
        while let Some(message) = messages.recv().await {
            self.dispatch_message(message).await;
        }
        tracing::debug!("OAuth message channel closed");
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    fn accept(&self, response: AuthResponse) -> LoginOutcome {
        if !response.success {
            return LoginOutcome::failed(
                response
                    .message
                    .unwrap_or_else(|| "Invalid credentials".to_string()),
            );
        }

        let Some(user) = response.user else {
            return LoginOutcome::failed("Login response did not include a user");
        };

        if let Some(token) = response.token.as_deref() {
            if let Err(e) = self.credentials.set_token(token) {
                tracing::error!(error = %e, "Failed to persist token");
            }
        }
        if let Some(refresh) = response.refresh_token.as_deref() {
            if let Err(e) = self.credentials.set_refresh_token(refresh) {
                tracing::warn!(error = %e, "Failed to persist refresh token");
            }
        }

        tracing::info!(user_id = %user.id, "Login successful");
        self.remember(&user);
        self.update(|s| s.state = SessionState::Authenticated(user));
        LoginOutcome::succeeded()
    }

    /// Persist identity details for the next startup.
    fn remember(&self, user: &User) {
        if let Err(e) = self
            .credentials
            .set_user_id(&user.id)
            .and_then(|_| self.credentials.set_cached_user(user))
        {
            tracing::warn!(error = %e, "Failed to persist user details");
        }
    }

    fn invalidate(&self) {
        if let Err(e) = self.credentials.clear_session() {
            tracing::warn!(error = %e, "Failed to remove stored token");
        }
        self.update(|s| {
            s.state = SessionState::Invalid;
            s.loading = false;
        });
    }
}

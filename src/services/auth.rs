// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication endpoints: credential login, registration, logout and
//! OAuth entry points.

use crate::error::{ClientError, Result};
use crate::gateway::{ApiRequest, HttpGateway};
use crate::models::User;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use validator::Validate;

/// Supported OAuth identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            other => Err(format!("unknown OAuth provider: {}", other)),
        }
    }
}

#[derive(Serialize, Validate)]
struct LoginRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

#[derive(Serialize, Validate)]
struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

/// Login/registration response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthResponse {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Pull `message` out of a JSON error body, if there is one.
fn rejection_message(body: &str) -> Option<String> {
    serde_json::from_str::<AuthResponse>(body)
        .ok()
        .and_then(|r| r.message)
}

/// Client for `/auth/*`.
#[derive(Clone)]
pub struct AuthClient {
    gateway: Arc<HttpGateway>,
}

impl AuthClient {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    /// Log in with email and password.
    ///
    /// Rejected credentials come back as `Ok` with `success = false`; only
    /// transport and unexpected server failures are errors.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        body.validate()?;

        let request = ApiRequest::post("/auth/login")
            .json(&body)
            .map_err(|e| ClientError::Internal(e.into()))?
            .no_refresh();

        self.submit(request).await
    }

    /// Create an account.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let body = RegisterRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        body.validate()?;

        let request = ApiRequest::post("/auth/register")
            .json(&body)
            .map_err(|e| ClientError::Internal(e.into()))?
            .no_refresh();

        self.submit(request).await
    }

    /// Tell the backend the session for `token` is over.
    pub async fn logout(&self, token: Option<&str>) -> Result<()> {
        let mut request = ApiRequest::post("/auth/logout").no_refresh();
        if let Some(token) = token {
            request = request.with_bearer(token);
        }
        self.gateway.send(request).await?;
        Ok(())
    }

    /// Authorization URL the host should open to start an OAuth flow.
    pub fn oauth_url(&self, provider: OAuthProvider) -> String {
        format!(
            "{}/oauth2/authorization/{}",
            self.gateway.config().oauth_base_url,
            provider.as_str()
        )
    }

    async fn submit(&self, request: ApiRequest) -> Result<AuthResponse> {
        match self.gateway.send_json::<AuthResponse>(request).await {
            Ok(response) => Ok(response),
            Err(ClientError::Unauthorized) => Ok(AuthResponse::rejected("Invalid credentials")),
            Err(ClientError::Http { status, body }) if (400..500).contains(&status) => {
                Ok(AuthResponse::rejected(
                    rejection_message(&body).unwrap_or_else(|| format!("Request rejected ({})", status)),
                ))
            }
            Err(e) => Err(e),
        }
    }
}

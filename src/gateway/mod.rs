// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP gateway to the SkillShare REST API.
//!
//! Handles:
//! - Bearer token injection from the credential store
//! - One refresh-and-replay per request on 401
//! - Forced logout on unrecoverable 401 and on 403 (non-public paths)
//! - Identity-provider redirects surfaced as `AuthRequired`
//! - Transport failures surfaced as `Network`, distinct from HTTP errors

pub mod navigator;
pub mod request;

pub use navigator::{LogNavigator, Navigator};
pub use request::{ApiRequest, FormPart, FormValue, RequestBody};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::storage::Credentials;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const REFRESH_PATH: &str = "/auth/refresh";

/// Single configured HTTP client shared by every resource client.
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    credentials: Credentials,
    navigator: Arc<dyn Navigator>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Token refresh response from `/auth/refresh`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    #[serde(alias = "accessToken")]
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl HttpGateway {
    /// Create a gateway. Redirects are never followed so identity-provider
    /// bounces can be detected.
    pub fn new(
        config: Arc<ClientConfig>,
        credentials: Credentials,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| {
            ClientError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            http,
            config,
            credentials,
            navigator,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // ─── Typed helpers ───────────────────────────────────────────────────────

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(encode(ApiRequest::post(path), body)?).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(encode(ApiRequest::put(path), body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Send and parse the JSON response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let path = request.path.clone();
        let response = self.send(request).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("{}: {}", path, e)))
    }

    // ─── Core send loop ──────────────────────────────────────────────────────

    /// Send a request, applying the auth-failure policy.
    ///
    /// A 401 is retried at most once per request: the stored refresh token
    /// is exchanged and the request replayed with the new access token. The
    /// replay's outcome is final.
    pub async fn send(&self, mut request: ApiRequest) -> Result<Response> {
        loop {
            let response = self.dispatch(&request).await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::UNAUTHORIZED && !request.retried {
                request.retried = true;
                tracing::info!(path = %request.path, "Got 401, attempting token refresh");

                match self.refresh_access_token().await {
                    Ok(()) => {
                        // Replay with the refreshed stored token
                        request.bearer = None;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, path = %request.path, "Token refresh failed");
                        self.end_session(&request.path);
                        return Err(ClientError::Unauthorized);
                    }
                }
            }

            return Err(self.classify_failure(&request, response).await);
        }
    }

    /// Build and send one attempt of `request`.
    async fn dispatch(&self, request: &ApiRequest) -> Result<Response> {
        let url = format!("{}{}", self.config.api_base_url, request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let token = match &request.bearer {
            Some(token) => Some(token.clone()),
            None => self.credentials.token()?,
        };
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        // Multipart: reqwest sets the content type including the boundary
        builder = match &request.body {
            RequestBody::Empty => builder.header(CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            retried = request.retried,
            "API request"
        );

        builder.send().await.map_err(|e| {
            tracing::error!(
                error = %e,
                path = %request.path,
                "Network error - is the backend server running and reachable?"
            );
            ClientError::Network(e.to_string())
        })
    }

    /// Map a non-success response to an error, applying redirect side effects.
    async fn classify_failure(&self, request: &ApiRequest, response: Response) -> ClientError {
        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        tracing::warn!(
            status = status.as_u16(),
            method = %request.method,
            path = %request.path,
            "API request failed"
        );

        if status.is_redirection() {
            if let Some(location) = location {
                if self.config.is_identity_provider(&location) {
                    tracing::info!(location = %location, "Redirected to identity provider");
                    return ClientError::AuthRequired { location };
                }
            }
            return ClientError::Http {
                status: status.as_u16(),
                body,
            };
        }

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => {
                if !self.config.is_public_path(&request.path) {
                    self.navigator.redirect_to_login(&self.config.login_path);
                }
                ClientError::Forbidden
            }
            StatusCode::NOT_FOUND => ClientError::NotFound(request.path.clone()),
            _ => ClientError::Http {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// Exchange the stored refresh token for a new access token.
    async fn refresh_access_token(&self) -> Result<()> {
        let refresh_token = self
            .credentials
            .refresh_token()?
            .ok_or(ClientError::Unauthorized)?;

        let url = format!("{}{}", self.config.api_base_url, REFRESH_PATH);
        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let tokens: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("Failed to parse refresh response: {}", e)))?;

        self.credentials.set_token(&tokens.token)?;
        if let Some(rotated) = tokens.refresh_token.as_deref() {
            self.credentials.set_refresh_token(rotated)?;
        }

        tracing::info!("Access token refreshed");
        Ok(())
    }

    /// Purge credentials and send the host to login, unless `path` is public.
    fn end_session(&self, path: &str) {
        if self.config.is_public_path(path) {
            tracing::debug!(path, "Auth failure on public endpoint, keeping session");
            return;
        }

        if let Err(e) = self.credentials.clear() {
            tracing::warn!(error = %e, "Failed to purge credentials");
        }
        self.navigator.redirect_to_login(&self.config.login_path);
    }
}

fn encode<B: Serialize + ?Sized>(request: ApiRequest, body: &B) -> Result<ApiRequest> {
    request
        .json(body)
        .map_err(|e| ClientError::Internal(anyhow::anyhow!("Failed to encode request: {}", e)))
}

fn build_form(parts: &[FormPart]) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
            FormValue::File {
                file_name,
                mime,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime).map_err(|e| {
                        ClientError::Internal(anyhow::anyhow!("Invalid MIME type {}: {}", mime, e))
                    })?;
                }
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}

//! User profile client (`/users`).

use super::fallback::{not_found, FallbackPolicy, Fetched};
use super::repository::UserRepository;
use super::segment;
use crate::error::{ClientError, Result};
use crate::gateway::{ApiRequest, HttpGateway};
use crate::models::User;
use std::sync::Arc;

/// Profile of the bearer of the current token.
const PROFILE_PATH: &str = "/users/me";

#[derive(Clone)]
pub struct UserClient {
    gateway: Arc<HttpGateway>,
    repository: UserRepository,
    fallback: FallbackPolicy,
}

impl UserClient {
    pub fn new(
        gateway: Arc<HttpGateway>,
        repository: UserRepository,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            gateway,
            repository,
            fallback,
        }
    }

    /// Profile for the current token, `None` if the backend has no user for it.
    ///
    /// Never served from fallback data: the session store relies on this to
    /// decide whether a stored token is still valid.
    pub async fn current(&self) -> Result<Option<User>> {
        let response = match self.gateway.send(ApiRequest::get(PROFILE_PATH)).await {
            Ok(response) => response,
            Err(ClientError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Decode(format!("{}: {}", PROFILE_PATH, e)))?;
        let body = body.trim();

        if body.is_empty() || body == "null" {
            return Ok(None);
        }

        serde_json::from_str(body)
            .map(Some)
            .map_err(|e| ClientError::Decode(format!("{}: {}", PROFILE_PATH, e)))
    }

    /// GET /users/{id}
    pub async fn get_by_id(&self, user_id: &str) -> Result<Fetched<User>> {
        tracing::debug!(user_id, "Fetching user profile");
        let live = self
            .gateway
            .get_json(&format!("/users/{}", segment(user_id)))
            .await;

        self.fallback.resolve("get_user", live, || {
            self.repository
                .get(user_id)
                .ok_or_else(|| not_found("User", user_id))
        })
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! SkillShare client: sessions and typed API access for the learning-plan
//! platform.
//!
//! This crate provides the session store, the authenticated HTTP gateway
//! and the per-resource clients used by SkillShare frontends.

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

use config::ClientConfig;
use error::Result;
use gateway::{HttpGateway, Navigator};
use services::{
    AuthClient, FallbackPolicy, LearningPlanClient, NotificationClient, NotificationRepository,
    PlanRepository, UserClient, UserRepository,
};
use session::SessionStore;
use std::sync::Arc;
use storage::{CredentialStore, Credentials};

/// Fallback data used by the resource clients.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub plans: PlanRepository,
    pub users: UserRepository,
    pub notifications: NotificationRepository,
}

impl Default for Repositories {
    /// The built-in sample data.
    fn default() -> Self {
        Self {
            plans: PlanRepository::seeded(),
            users: UserRepository::seeded(),
            notifications: NotificationRepository::seeded(),
        }
    }
}

/// Shared client state: one gateway, one credential store, one session.
pub struct SkillShareClient {
    pub config: Arc<ClientConfig>,
    pub gateway: Arc<HttpGateway>,
    pub session: Arc<SessionStore>,
    pub plans: LearningPlanClient,
    pub users: UserClient,
    pub notifications: NotificationClient,
}

impl SkillShareClient {
    /// Wire up a client with the built-in fallback data.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        Self::with_repositories(config, store, navigator, Repositories::default())
    }

    pub fn with_repositories(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        repositories: Repositories,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let credentials = Credentials::new(store, config.token_key.clone());
        let gateway = Arc::new(HttpGateway::new(
            config.clone(),
            credentials.clone(),
            navigator,
        )?);
        let fallback = FallbackPolicy::from_flag(config.fallback_enabled);

        let users = UserClient::new(gateway.clone(), repositories.users, fallback);
        let session = Arc::new(SessionStore::new(
            AuthClient::new(gateway.clone()),
            users.clone(),
            credentials,
            config.app_origin.clone(),
        ));

        tracing::debug!(
            api = %config.api_base_url,
            fallback = fallback.is_enabled(),
            "SkillShare client initialized"
        );

        Ok(Self {
            plans: LearningPlanClient::new(gateway.clone(), repositories.plans, fallback),
            notifications: NotificationClient::new(
                gateway.clone(),
                repositories.notifications,
                fallback,
            ),
            users,
            session,
            gateway,
            config,
        })
    }

    /// Build the client and run the startup auth check.
    pub async fn start(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let client = Self::new(config, store, navigator)?;
        client.session.check_auth().await;
        Ok(client)
    }
}

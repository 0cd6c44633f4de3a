// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification client (`/notifications`).

use super::fallback::{not_found, FallbackPolicy, Fetched};
use super::repository::NotificationRepository;
use super::segment;
use crate::error::Result;
use crate::gateway::{ApiRequest, HttpGateway};
use crate::models::Notification;
use std::sync::Arc;

const NOTIFICATIONS_PATH: &str = "/notifications";

#[derive(Clone)]
pub struct NotificationClient {
    gateway: Arc<HttpGateway>,
    repository: NotificationRepository,
    fallback: FallbackPolicy,
}

impl NotificationClient {
    pub fn new(
        gateway: Arc<HttpGateway>,
        repository: NotificationRepository,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            gateway,
            repository,
            fallback,
        }
    }

    pub fn repository(&self) -> &NotificationRepository {
        &self.repository
    }

    /// GET /notifications?userId={id}
    pub async fn get_for_user(&self, user_id: &str) -> Result<Fetched<Vec<Notification>>> {
        tracing::debug!(user_id, "Fetching notifications");
        let request = ApiRequest::get(NOTIFICATIONS_PATH).query("userId", user_id);
        let live = self.gateway.send_json(request).await;

        self.fallback.resolve("get_notifications", live, || {
            Ok(self.repository.for_user(user_id))
        })
    }

    /// PUT /notifications/{id}/read
    pub async fn mark_as_read(&self, notification_id: &str) -> Result<Fetched<Notification>> {
        let path = format!("{}/{}/read", NOTIFICATIONS_PATH, segment(notification_id));
        let live = self.gateway.send_json(ApiRequest::put(path)).await;

        self.fallback.resolve("mark_notification_read", live, || {
            self.repository
                .mark_read(notification_id)
                .ok_or_else(|| not_found("Notification", notification_id))
        })
    }

    /// PUT /notifications/read-all?userId={id}
    pub async fn mark_all_as_read(&self, user_id: &str) -> Result<Fetched<()>> {
        let request =
            ApiRequest::put(format!("{}/read-all", NOTIFICATIONS_PATH)).query("userId", user_id);
        let live = self.gateway.send(request).await.map(|_| ());

        self.fallback.resolve("mark_all_notifications_read", live, || {
            let changed = self.repository.mark_all_read(user_id);
            tracing::debug!(user_id, changed, "Marked fallback notifications read");
            Ok(())
        })
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Learning plan client (`/learning-plans`).
//!
//! Reads and writes go to the backend first. On failure, with the fallback
//! enabled, the plan repository answers instead and the result is tagged
//! [`Fetched::Degraded`].

use super::fallback::{not_found, FallbackPolicy, Fetched};
use super::repository::PlanRepository;
use super::segment;
use crate::error::{ClientError, Result};
use crate::gateway::{ApiRequest, HttpGateway};
use crate::models::{
    CreateLearningPlanRequest, LearningPlan, LearningPlanGenerationRequest,
    UpdateLearningPlanRequest,
};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

const PLANS_PATH: &str = "/learning-plans";

fn plan_path(plan_id: &str) -> String {
    format!("{}/{}", PLANS_PATH, segment(plan_id))
}

fn encode<B: serde::Serialize + ?Sized>(request: ApiRequest, body: &B) -> Result<ApiRequest> {
    request
        .json(body)
        .map_err(|e| ClientError::Internal(e.into()))
}

/// Learning plan API client with in-memory fallback.
#[derive(Clone)]
pub struct LearningPlanClient {
    gateway: Arc<HttpGateway>,
    repository: PlanRepository,
    fallback: FallbackPolicy,
}

impl LearningPlanClient {
    pub fn new(
        gateway: Arc<HttpGateway>,
        repository: PlanRepository,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            gateway,
            repository,
            fallback,
        }
    }

    pub fn repository(&self) -> &PlanRepository {
        &self.repository
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    /// GET /learning-plans
    pub async fn get_all(&self) -> Result<Fetched<Vec<LearningPlan>>> {
        tracing::debug!("Fetching all learning plans");
        let live = self.gateway.get_json(PLANS_PATH).await;

        self.fallback
            .resolve("get_all_learning_plans", live, || Ok(self.repository.all()))
    }

    /// GET /learning-plans/{id}
    pub async fn get_by_id(&self, plan_id: &str) -> Result<Fetched<LearningPlan>> {
        tracing::debug!(plan_id, "Fetching learning plan");
        let live = self.gateway.get_json(&plan_path(plan_id)).await;

        self.fallback.resolve("get_learning_plan", live, || {
            self.repository
                .get(plan_id)
                .ok_or_else(|| not_found("Learning plan", plan_id))
        })
    }

    /// GET /learning-plans?userId={id}
    pub async fn get_for_user(&self, user_id: &str) -> Result<Fetched<Vec<LearningPlan>>> {
        tracing::debug!(user_id, "Fetching learning plans for user");
        let request = ApiRequest::get(PLANS_PATH).query("userId", user_id);
        let live = self.gateway.send_json(request).await;

        self.fallback.resolve("get_user_learning_plans", live, || {
            Ok(self.repository.for_user(user_id))
        })
    }

    // ─── Writes ──────────────────────────────────────────────────────────────

    /// POST /learning-plans?userId={id}
    ///
    /// Invalid payloads are rejected before any request is made.
    pub async fn create(
        &self,
        user_id: &str,
        plan: &CreateLearningPlanRequest,
    ) -> Result<Fetched<LearningPlan>> {
        plan.validate()?;

        tracing::info!(user_id, title = %plan.title, "Creating learning plan");
        let request = encode(ApiRequest::post(PLANS_PATH).query("userId", user_id), plan)?;
        let live = self.gateway.send_json(request).await;

        self.fallback.resolve("create_learning_plan", live, || {
            let now = Utc::now();
            let created = LearningPlan {
                id: self.repository.allocate_id(now.timestamp_millis()),
                title: plan.title.clone(),
                description: plan.description.clone(),
                subject: plan.subject.clone(),
                topics: plan.topics.clone(),
                resources: plan.resources.clone(),
                completion_percentage: 0.0,
                estimated_days: plan.estimated_days,
                followers: 0,
                created_at: now.to_rfc3339(),
                user_id: user_id.to_string(),
                following: false,
                user: self.repository.default_author(),
            };
            self.repository.insert(created.clone());
            Ok(created)
        })
    }

    /// PUT /learning-plans/{id}
    pub async fn update(
        &self,
        plan_id: &str,
        patch: &UpdateLearningPlanRequest,
    ) -> Result<Fetched<LearningPlan>> {
        tracing::info!(plan_id, "Updating learning plan");
        let live = self.gateway.put_json(&plan_path(plan_id), patch).await;

        self.fallback.resolve("update_learning_plan", live, || {
            self.repository
                .update(plan_id, patch)
                .ok_or_else(|| not_found("Learning plan", plan_id))
        })
    }

    /// DELETE /learning-plans/{id}
    pub async fn delete(&self, plan_id: &str) -> Result<Fetched<()>> {
        tracing::info!(plan_id, "Deleting learning plan");
        let live = self.gateway.delete(&plan_path(plan_id)).await;

        self.fallback.resolve("delete_learning_plan", live, || {
            if !self.repository.remove(plan_id) {
                tracing::debug!(plan_id, "Plan absent from fallback data");
            }
            Ok(())
        })
    }

    /// POST /learning-plans/{id}/follow
    pub async fn follow(&self, plan_id: &str, user_id: &str) -> Result<Fetched<LearningPlan>> {
        self.set_following(plan_id, user_id, true).await
    }

    /// POST /learning-plans/{id}/unfollow
    pub async fn unfollow(&self, plan_id: &str, user_id: &str) -> Result<Fetched<LearningPlan>> {
        self.set_following(plan_id, user_id, false).await
    }

    async fn set_following(
        &self,
        plan_id: &str,
        user_id: &str,
        following: bool,
    ) -> Result<Fetched<LearningPlan>> {
        let action = if following { "follow" } else { "unfollow" };
        tracing::info!(plan_id, user_id, action, "Changing plan follow state");

        let path = format!("{}/{}", plan_path(plan_id), action);
        let live = self.gateway.post_json(&path, user_id).await;

        self.fallback.resolve(action, live, || {
            self.repository
                .set_following(plan_id, following)
                .ok_or_else(|| not_found("Learning plan", plan_id))
        })
    }

    /// POST /learning-plans/{planId}/topics/{topicId}/toggle-completion
    pub async fn toggle_topic_completion(
        &self,
        plan_id: &str,
        topic_id: &str,
    ) -> Result<Fetched<LearningPlan>> {
        tracing::info!(plan_id, topic_id, "Toggling topic completion");
        let path = format!(
            "{}/topics/{}/toggle-completion",
            plan_path(plan_id),
            segment(topic_id)
        );
        let live = self.gateway.send_json(ApiRequest::post(path)).await;

        self.fallback.resolve("toggle_topic_completion", live, || {
            self.repository
                .toggle_topic(plan_id, topic_id)
                .ok_or_else(|| self.missing_topic(plan_id, topic_id))
        })
    }

    /// Mark one topic completed (or not) via read-modify-write.
    ///
    /// The whole plan is fetched and sent back as the update payload, since
    /// the backend replaces the entity on PUT. A topic id that the live plan
    /// does not contain is `NotFound` and is not masked by the fallback.
    pub async fn mark_topic_as_completed(
        &self,
        plan_id: &str,
        topic_id: &str,
        completed: bool,
    ) -> Result<Fetched<LearningPlan>> {
        tracing::info!(plan_id, topic_id, completed, "Marking topic");

        let live = match self.gateway.get_json::<LearningPlan>(&plan_path(plan_id)).await {
            Ok(mut plan) => {
                if !plan.set_topic_completed(topic_id, completed) {
                    return Err(not_found("Topic", topic_id));
                }
                let update = UpdateLearningPlanRequest::from(&plan);
                self.gateway.put_json(&plan_path(plan_id), &update).await
            }
            Err(e) => Err(e),
        };

        self.fallback.resolve("mark_topic_as_completed", live, || {
            self.repository
                .set_topic_completed(plan_id, topic_id, completed)
                .ok_or_else(|| self.missing_topic(plan_id, topic_id))
        })
    }

    /// Which of plan or topic is absent from the fallback data.
    fn missing_topic(&self, plan_id: &str, topic_id: &str) -> ClientError {
        if self.repository.get(plan_id).is_some() {
            not_found("Topic", topic_id)
        } else {
            not_found("Learning plan", plan_id)
        }
    }

    /// POST /learning-plans/generate
    ///
    /// Generation happens server-side; there is no fallback.
    pub async fn generate(&self, request: &LearningPlanGenerationRequest) -> Result<LearningPlan> {
        request.validate()?;

        tracing::info!(subject = %request.subject, "Requesting generated learning plan");
        self.gateway
            .post_json(&format!("{}/generate", PLANS_PATH), request)
            .await
    }
}

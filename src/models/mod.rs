// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the SkillShare API.

pub mod learning_plan;
pub mod notification;
pub mod user;

pub use learning_plan::{
    CreateLearningPlanRequest, LearningPlan, LearningPlanGenerationRequest, PlanAuthor, Resource,
    ResourceKind, Topic, UpdateLearningPlanRequest,
};
pub use notification::{Notification, NotificationKind};
pub use user::User;

/// Serde helpers for backend quirks.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    /// The backend emits numeric ids (JPA `Long`) while the API contract
    /// treats every id as a string. Accept both.
    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            serde_json::Value::Null => Ok(String::new()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number id, got {}",
                other
            ))),
        }
    }

    pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Some(id(deserializer)?).filter(|s| !s.is_empty()))
    }
}

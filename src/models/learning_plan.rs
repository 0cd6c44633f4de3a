// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Learning plan models: plans, topics, resources and request payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A structured study curriculum.
///
/// `completion_percentage` is stored as the backend reports it; it is never
/// recomputed from `topics` (see [`LearningPlan::topic_completion_ratio`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlan {
    #[serde(deserialize_with = "super::de::id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub estimated_days: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, deserialize_with = "super::de::id")]
    pub user_id: String,
    /// Whether the current user follows this plan
    #[serde(default)]
    pub following: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PlanAuthor>,
}

impl LearningPlan {
    /// Fraction of topics marked completed, or `None` for a plan without topics.
    pub fn topic_completion_ratio(&self) -> Option<f64> {
        if self.topics.is_empty() {
            return None;
        }
        let done = self.topics.iter().filter(|t| t.completed).count();
        Some(done as f64 / self.topics.len() as f64)
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    /// Set one topic's completion flag. Returns false if no topic has that id.
    pub fn set_topic_completed(&mut self, topic_id: &str, completed: bool) -> bool {
        match self.topics.iter_mut().find(|t| t.id == topic_id) {
            Some(topic) => {
                topic.completed = completed;
                true
            }
            None => false,
        }
    }
}

/// Creator summary embedded in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAuthor {
    #[serde(deserialize_with = "super::de::id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Topic {
    #[serde(default, deserialize_with = "super::de::id")]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Resource {
    #[serde(default, deserialize_with = "super::de::id")]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(url)]
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Link,
    Document,
    Video,
}

/// Payload for `POST /learning-plans`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLearningPlanRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[serde(default)]
    #[validate(nested)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    #[validate(nested)]
    pub resources: Vec<Resource>,
    #[validate(range(min = 1, max = 3650))]
    pub estimated_days: u32,
}

/// Payload for `PUT /learning-plans/{id}`.
///
/// Absent fields are left untouched by the in-memory fallback. The live
/// backend replaces the whole entity, so callers that flip a single field
/// should start from [`UpdateLearningPlanRequest::from`] a full plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLearningPlanRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following: Option<bool>,
}

impl UpdateLearningPlanRequest {
    /// Merge the present fields into `plan`.
    pub fn apply_to(&self, plan: &mut LearningPlan) {
        if let Some(title) = &self.title {
            plan.title = title.clone();
        }
        if let Some(description) = &self.description {
            plan.description = description.clone();
        }
        if let Some(subject) = &self.subject {
            plan.subject = subject.clone();
        }
        if let Some(created_at) = &self.created_at {
            plan.created_at = created_at.clone();
        }
        if let Some(topics) = &self.topics {
            plan.topics = topics.clone();
        }
        if let Some(resources) = &self.resources {
            plan.resources = resources.clone();
        }
        if let Some(pct) = self.completion_percentage {
            plan.completion_percentage = pct;
        }
        if let Some(days) = self.estimated_days {
            plan.estimated_days = days;
        }
        if let Some(followers) = self.followers {
            plan.followers = followers;
        }
        if let Some(user_id) = &self.user_id {
            plan.user_id = user_id.clone();
        }
        if let Some(following) = self.following {
            plan.following = following;
        }
    }
}

impl From<&LearningPlan> for UpdateLearningPlanRequest {
    /// Full-entity payload. `completionPercentage` and the embedded author
    /// are server-owned and left out.
    fn from(plan: &LearningPlan) -> Self {
        Self {
            id: Some(plan.id.clone()),
            title: Some(plan.title.clone()),
            description: Some(plan.description.clone()),
            subject: Some(plan.subject.clone()),
            created_at: Some(plan.created_at.clone()),
            topics: Some(plan.topics.clone()),
            resources: Some(plan.resources.clone()),
            completion_percentage: None,
            estimated_days: Some(plan.estimated_days),
            followers: Some(plan.followers),
            user_id: Some(plan.user_id.clone()),
            following: Some(plan.following),
        }
    }
}

/// Payload for `POST /learning-plans/generate`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlanGenerationRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 3650))]
    pub estimated_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_json() -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "title": "Rust Fundamentals",
            "description": "Ownership, traits, async",
            "subject": "Technology",
            "topics": [
                { "id": 1, "title": "Ownership", "completed": true },
                { "id": 2, "title": "Traits", "completed": false }
            ],
            "resources": [
                { "id": 3, "title": "The Book", "url": "https://doc.rust-lang.org/book/", "type": "document" }
            ],
            "completionPercentage": 50,
            "estimatedDays": 10,
            "followers": 4,
            "createdAt": "2025-01-01T00:00:00Z",
            "userId": 12,
            "following": false
        })
    }

    #[test]
    fn test_numeric_ids_deserialize_as_strings() {
        let plan: LearningPlan = serde_json::from_value(plan_json()).unwrap();

        assert_eq!(plan.id, "7");
        assert_eq!(plan.user_id, "12");
        assert_eq!(plan.topics[1].id, "2");
        assert_eq!(plan.resources[0].kind, ResourceKind::Document);
        assert!(plan.user.is_none());
    }

    #[test]
    fn test_topic_completion_ratio_is_independent_of_stored_percentage() {
        let mut plan: LearningPlan = serde_json::from_value(plan_json()).unwrap();
        plan.completion_percentage = 90.0;

        assert_eq!(plan.topic_completion_ratio(), Some(0.5));
        assert_eq!(plan.completion_percentage, 90.0);

        plan.topics.clear();
        assert_eq!(plan.topic_completion_ratio(), None);
    }

    #[test]
    fn test_set_topic_completed_touches_only_that_topic() {
        let mut plan: LearningPlan = serde_json::from_value(plan_json()).unwrap();
        let before = plan.clone();

        assert!(plan.set_topic_completed("2", true));
        assert!(plan.topic("2").unwrap().completed);
        assert_eq!(plan.topics[0], before.topics[0]);
        assert_eq!(plan.title, before.title);

        assert!(!plan.set_topic_completed("missing", true));
    }

    #[test]
    fn test_update_request_from_plan_omits_server_owned_fields() {
        let plan: LearningPlan = serde_json::from_value(plan_json()).unwrap();
        let body = serde_json::to_value(UpdateLearningPlanRequest::from(&plan)).unwrap();

        assert_eq!(body["title"], "Rust Fundamentals");
        assert_eq!(body["estimatedDays"], 10);
        assert_eq!(body["topics"].as_array().unwrap().len(), 2);
        assert!(body.get("completionPercentage").is_none());
        assert!(body.get("user").is_none());
    }

    #[test]
    fn test_partial_update_applies_present_fields_only() {
        let mut plan: LearningPlan = serde_json::from_value(plan_json()).unwrap();
        let patch = UpdateLearningPlanRequest {
            title: Some("Advanced Rust".to_string()),
            following: Some(true),
            ..Default::default()
        };

        patch.apply_to(&mut plan);

        assert_eq!(plan.title, "Advanced Rust");
        assert!(plan.following);
        assert_eq!(plan.subject, "Technology");
        assert_eq!(plan.topics.len(), 2);
    }

    #[test]
    fn test_create_request_validation() {
        let mut request = CreateLearningPlanRequest {
            title: "Rust".to_string(),
            description: String::new(),
            subject: "Technology".to_string(),
            topics: vec![],
            resources: vec![Resource {
                id: String::new(),
                title: "The Book".to_string(),
                url: "https://doc.rust-lang.org/book/".to_string(),
                kind: ResourceKind::Link,
            }],
            estimated_days: 14,
        };
        assert!(request.validate().is_ok());

        request.resources[0].url = "not a url".to_string();
        assert!(request.validate().is_err());

        request.resources.clear();
        request.title.clear();
        assert!(request.validate().is_err());
    }
}

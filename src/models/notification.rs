//! Notification model.

use serde::{Deserialize, Serialize};

/// Activity notification delivered to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(deserialize_with = "super::de::id")]
    pub id: String,
    #[serde(deserialize_with = "super::de::id")]
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    /// Plan the notification refers to, if any
    #[serde(
        default,
        deserialize_with = "super::de::optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    Like,
    Comment,
    PlanUpdate,
    #[serde(other)]
    Other,
}

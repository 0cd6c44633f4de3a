//! User model for the session and profile endpoints.

use serde::{Deserialize, Serialize};

/// Authenticated user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "super::de::id")]
    pub id: String,
    pub name: String,
    /// Login handle (the backend omits it for email-only accounts)
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Profile picture URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

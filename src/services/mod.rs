// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - typed clients per backend resource.

pub mod auth;
pub mod fallback;
pub mod learning_plans;
pub mod notifications;
pub mod repository;
pub mod users;

pub use auth::{AuthClient, AuthResponse, OAuthProvider};
pub use fallback::{FallbackPolicy, Fetched};
pub use learning_plans::LearningPlanClient;
pub use notifications::NotificationClient;
pub use repository::{NotificationRepository, PlanRepository, UserRepository};
pub use users::UserClient;

/// Percent-encode a single path segment.
pub(crate) fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

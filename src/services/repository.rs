// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory repositories backing the resource-client fallback.
//!
//! Each client owns its repository (cloned handles share the same data).
//! Nothing here is persisted; it lives as long as the client does.

use crate::models::{
    LearningPlan, Notification, NotificationKind, PlanAuthor, Resource, ResourceKind, Topic,
    UpdateLearningPlanRequest, User,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Learning plans ─────────────────────────────────────────────────────────

/// Fallback store for learning plans.
#[derive(Debug, Clone, Default)]
pub struct PlanRepository {
    plans: Arc<Mutex<Vec<LearningPlan>>>,
    next_local_id: Arc<AtomicU64>,
}

impl PlanRepository {
    pub fn new(plans: Vec<LearningPlan>) -> Self {
        Self {
            plans: Arc::new(Mutex::new(plans)),
            next_local_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Repository holding the built-in sample plans.
    pub fn seeded() -> Self {
        Self::new(sample_plans())
    }

    pub fn all(&self) -> Vec<LearningPlan> {
        lock(&self.plans).clone()
    }

    pub fn get(&self, plan_id: &str) -> Option<LearningPlan> {
        lock(&self.plans).iter().find(|p| p.id == plan_id).cloned()
    }

    pub fn for_user(&self, user_id: &str) -> Vec<LearningPlan> {
        lock(&self.plans)
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Author of the first stored plan, used as creator of fallback plans.
    pub fn default_author(&self) -> Option<PlanAuthor> {
        lock(&self.plans).first().and_then(|p| p.user.clone())
    }

    /// Id for a plan created while offline: `plan-<millis>-<seq>`.
    pub fn allocate_id(&self, now_millis: i64) -> String {
        let seq = self.next_local_id.fetch_add(1, Ordering::Relaxed);
        format!("plan-{}-{}", now_millis, seq)
    }

    pub fn insert(&self, plan: LearningPlan) {
        lock(&self.plans).push(plan);
    }

    pub fn update(&self, plan_id: &str, patch: &UpdateLearningPlanRequest) -> Option<LearningPlan> {
        let mut plans = lock(&self.plans);
        let plan = plans.iter_mut().find(|p| p.id == plan_id)?;
        patch.apply_to(plan);
        Some(plan.clone())
    }

    /// Remove a plan. Returns whether it existed.
    pub fn remove(&self, plan_id: &str) -> bool {
        let mut plans = lock(&self.plans);
        let before = plans.len();
        plans.retain(|p| p.id != plan_id);
        plans.len() != before
    }

    /// Set the follow flag, adjusting the follower count on a change.
    pub fn set_following(&self, plan_id: &str, following: bool) -> Option<LearningPlan> {
        let mut plans = lock(&self.plans);
        let plan = plans.iter_mut().find(|p| p.id == plan_id)?;
        if plan.following != following {
            plan.followers = if following {
                plan.followers.saturating_add(1)
            } else {
                plan.followers.saturating_sub(1)
            };
            plan.following = following;
        }
        Some(plan.clone())
    }

    pub fn set_topic_completed(
        &self,
        plan_id: &str,
        topic_id: &str,
        completed: bool,
    ) -> Option<LearningPlan> {
        let mut plans = lock(&self.plans);
        let plan = plans.iter_mut().find(|p| p.id == plan_id)?;
        if !plan.set_topic_completed(topic_id, completed) {
            return None;
        }
        Some(plan.clone())
    }

    /// Flip one topic. `None` if the plan or the topic does not exist.
    pub fn toggle_topic(&self, plan_id: &str, topic_id: &str) -> Option<LearningPlan> {
        let mut plans = lock(&self.plans);
        let plan = plans.iter_mut().find(|p| p.id == plan_id)?;
        let topic = plan.topics.iter_mut().find(|t| t.id == topic_id)?;
        topic.completed = !topic.completed;
        Some(plan.clone())
    }
}

// ─── Users ──────────────────────────────────────────────────────────────────

/// Fallback store for user profiles.
#[derive(Debug, Clone, Default)]
pub struct UserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl UserRepository {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn seeded() -> Self {
        Self::new(sample_users())
    }

    pub fn get(&self, user_id: &str) -> Option<User> {
        lock(&self.users).iter().find(|u| u.id == user_id).cloned()
    }

    pub fn all(&self) -> Vec<User> {
        lock(&self.users).clone()
    }
}

// ─── Notifications ──────────────────────────────────────────────────────────

/// Fallback store for notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationRepository {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationRepository {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self {
            notifications: Arc::new(Mutex::new(notifications)),
        }
    }

    pub fn seeded() -> Self {
        Self::new(sample_notifications())
    }

    pub fn for_user(&self, user_id: &str) -> Vec<Notification> {
        lock(&self.notifications)
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn mark_read(&self, notification_id: &str) -> Option<Notification> {
        let mut notifications = lock(&self.notifications);
        let notification = notifications.iter_mut().find(|n| n.id == notification_id)?;
        notification.read = true;
        Some(notification.clone())
    }

    /// Mark every notification of `user_id` read. Returns how many changed.
    pub fn mark_all_read(&self, user_id: &str) -> usize {
        let mut changed = 0;
        for n in lock(&self.notifications)
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            n.read = true;
            changed += 1;
        }
        changed
    }
}

// ─── Sample data ────────────────────────────────────────────────────────────

fn author(id: &str, name: &str, username: &str, img: u32) -> PlanAuthor {
    PlanAuthor {
        id: id.to_string(),
        name: name.to_string(),
        username: username.to_string(),
        profile_picture: Some(format!("https://i.pravatar.cc/150?img={}", img)),
    }
}

fn topic(id: &str, title: &str, completed: bool) -> Topic {
    Topic {
        id: id.to_string(),
        title: title.to_string(),
        completed,
    }
}

fn resource(id: &str, title: &str, url: &str, kind: ResourceKind) -> Resource {
    Resource {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        kind,
    }
}

/// The three built-in sample plans.
pub fn sample_plans() -> Vec<LearningPlan> {
    let sarah = author("u1", "Sarah Miller", "sarahmiller", 32);
    let alex = author("u2", "Alex Johnson", "alexj", 11);
    let david = author("u3", "David Wilson", "davidw", 68);

    vec![
        LearningPlan {
            id: "1".to_string(),
            title: "Web Development with React".to_string(),
            description: "Learn modern web development using React. This comprehensive plan \
                          covers everything from fundamentals to advanced concepts."
                .to_string(),
            subject: "Technology".to_string(),
            topics: vec![
                topic("t1", "JavaScript Fundamentals", true),
                topic("t2", "React Basics", true),
                topic("t3", "State Management", false),
                topic("t4", "React Hooks", false),
            ],
            resources: vec![
                resource(
                    "r1",
                    "React Documentation",
                    "https://reactjs.org/docs/getting-started.html",
                    ResourceKind::Link,
                ),
                resource(
                    "r2",
                    "React Crash Course",
                    "https://www.youtube.com/watch?v=w7ejDZ8SWv8",
                    ResourceKind::Video,
                ),
                resource(
                    "r3",
                    "React Cheatsheet",
                    "https://reactcheatsheet.com/",
                    ResourceKind::Document,
                ),
            ],
            completion_percentage: 50.0,
            estimated_days: 21,
            followers: 42,
            created_at: "2025-03-01T09:00:00Z".to_string(),
            user_id: sarah.id.clone(),
            following: false,
            user: Some(sarah),
        },
        LearningPlan {
            id: "2".to_string(),
            title: "Mastering Basic Trigonometry".to_string(),
            description: "A step-by-step guide to understanding the fundamentals of \
                          trigonometry, from the unit circle to the laws of sines and cosines."
                .to_string(),
            subject: "Maths".to_string(),
            topics: vec![
                topic("t5", "Introduction to Trigonometry", true),
                topic("t6", "The Unit Circle", true),
                topic("t7", "Trigonometric Functions", true),
                topic("t8", "Solving Triangles", false),
            ],
            resources: vec![
                resource(
                    "r4",
                    "Khan Academy Trigonometry",
                    "https://www.khanacademy.org/math/trigonometry",
                    ResourceKind::Link,
                ),
                resource(
                    "r5",
                    "Trigonometry Formula Sheet",
                    "https://example.com/trig-formulas.pdf",
                    ResourceKind::Document,
                ),
            ],
            completion_percentage: 75.0,
            estimated_days: 14,
            followers: 67,
            created_at: "2025-02-22T09:00:00Z".to_string(),
            user_id: alex.id.clone(),
            following: true,
            user: Some(alex),
        },
        LearningPlan {
            id: "3".to_string(),
            title: "Java Programming: From Basics to Advanced".to_string(),
            description: "Comprehensive Java learning path covering everything from syntax \
                          to advanced concepts like multithreading and modern APIs."
                .to_string(),
            subject: "Technology".to_string(),
            topics: vec![
                topic("t9", "Java Syntax and Basics", true),
                topic("t10", "Object-Oriented Programming", false),
                topic("t11", "Collections Framework", false),
                topic("t12", "Multithreading", false),
            ],
            resources: vec![
                resource(
                    "r6",
                    "Java Documentation",
                    "https://docs.oracle.com/en/java/",
                    ResourceKind::Link,
                ),
                resource(
                    "r7",
                    "Java Video Course",
                    "https://example.com/java-course",
                    ResourceKind::Video,
                ),
            ],
            completion_percentage: 25.0,
            estimated_days: 30,
            followers: 95,
            created_at: "2025-02-15T09:00:00Z".to_string(),
            user_id: david.id.clone(),
            following: false,
            user: Some(david),
        },
    ]
}

/// Profiles for the authors of the sample plans.
pub fn sample_users() -> Vec<User> {
    sample_plans()
        .into_iter()
        .filter_map(|p| p.user)
        .map(|a| User {
            email: format!("{}@example.com", a.username),
            id: a.id,
            name: a.name,
            username: a.username,
            profile_picture: a.profile_picture,
            bio: None,
        })
        .collect()
}

pub fn sample_notifications() -> Vec<Notification> {
    let n = |id: &str, kind, message: &str, plan_id: Option<&str>, read, created_at: &str| {
        Notification {
            id: id.to_string(),
            user_id: "u1".to_string(),
            kind,
            message: message.to_string(),
            plan_id: plan_id.map(str::to_string),
            read,
            created_at: created_at.to_string(),
        }
    };

    vec![
        n(
            "n1",
            NotificationKind::Follow,
            "Alex Johnson started following Web Development with React",
            Some("1"),
            false,
            "2025-03-02T10:00:00Z",
        ),
        n(
            "n2",
            NotificationKind::Comment,
            "David Wilson commented on Web Development with React",
            Some("1"),
            false,
            "2025-03-03T12:30:00Z",
        ),
        n(
            "n3",
            NotificationKind::PlanUpdate,
            "Mastering Basic Trigonometry was updated",
            Some("2"),
            true,
            "2025-03-04T08:15:00Z",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_plans_are_deterministic() {
        let first = PlanRepository::seeded().all();
        let second = PlanRepository::seeded().all();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_repositories_are_scoped_per_instance() {
        let a = PlanRepository::seeded();
        let b = PlanRepository::seeded();

        assert!(a.remove("1"));
        assert_eq!(a.all().len(), 2);
        assert_eq!(b.all().len(), 3);

        // Cloned handles share data
        let a2 = a.clone();
        assert!(a2.get("1").is_none());
    }

    #[test]
    fn test_follow_toggling_adjusts_followers_once() {
        let repo = PlanRepository::seeded();

        let plan = repo.set_following("1", true).unwrap();
        assert!(plan.following);
        assert_eq!(plan.followers, 43);

        // Already following: no double count
        let plan = repo.set_following("1", true).unwrap();
        assert_eq!(plan.followers, 43);

        let plan = repo.set_following("1", false).unwrap();
        assert!(!plan.following);
        assert_eq!(plan.followers, 42);

        assert!(repo.set_following("missing", true).is_none());
    }

    #[test]
    fn test_unfollow_never_goes_negative() {
        let mut plan = sample_plans().remove(1);
        plan.followers = 0;
        let repo = PlanRepository::new(vec![plan]);

        let plan = repo.set_following("2", false).unwrap();
        assert_eq!(plan.followers, 0);
    }

    #[test]
    fn test_for_user_filters_by_owner() {
        let repo = PlanRepository::seeded();

        let plans = repo.for_user("u2");
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].title, "Mastering Basic Trigonometry");
        assert!(repo.for_user("nobody").is_empty());
    }

    #[test]
    fn test_topic_updates_reject_unknown_topic() {
        let repo = PlanRepository::seeded();

        let plan = repo.toggle_topic("1", "t3").unwrap();
        assert!(plan.topic("t3").unwrap().completed);

        assert!(repo.toggle_topic("1", "t999").is_none());
        assert!(repo.set_topic_completed("1", "t999", true).is_none());
        assert_eq!(repo.get("1").unwrap().topics, plan.topics);
    }

    #[test]
    fn test_allocated_ids_are_unique_within_a_millisecond() {
        let repo = PlanRepository::seeded();
        let clone = repo.clone();

        let a = repo.allocate_id(1_000);
        let b = repo.allocate_id(1_000);
        let c = clone.allocate_id(1_000);

        assert!(a.starts_with("plan-1000-"));
        assert_ne!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn test_notifications_mark_all_read() {
        let repo = NotificationRepository::seeded();

        assert_eq!(repo.mark_all_read("u1"), 2);
        assert!(repo.for_user("u1").iter().all(|n| n.read));
        assert_eq!(repo.mark_all_read("u1"), 0);
    }

    #[test]
    fn test_sample_users_match_plan_authors() {
        let users = UserRepository::seeded();

        let sarah = users.get("u1").unwrap();
        assert_eq!(sarah.username, "sarahmiller");
        assert_eq!(sarah.email, "sarahmiller@example.com");
        assert_eq!(users.all().len(), 3);
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Graceful degradation for resource clients.
//!
//! When a live call fails and the fallback is enabled, resource clients
//! answer from their in-memory repository instead. The answer is tagged
//! [`Fetched::Degraded`] so callers can still tell it apart from real data.

use crate::error::{ClientError, Result};

/// Result of a resource-client call that may have been served from fallback data.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// Served by the backend.
    Live(T),
    /// Served from the in-memory repository because the live call failed.
    Degraded { data: T, reason: String },
}

impl<T> Fetched<T> {
    pub fn data(&self) -> &T {
        match self {
            Fetched::Live(data) | Fetched::Degraded { data, .. } => data,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Fetched::Live(data) | Fetched::Degraded { data, .. } => data,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Fetched::Degraded { .. })
    }

    /// Why the live call failed, for degraded results.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Fetched::Live(_) => None,
            Fetched::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetched<U> {
        match self {
            Fetched::Live(data) => Fetched::Live(f(data)),
            Fetched::Degraded { data, reason } => Fetched::Degraded {
                data: f(data),
                reason,
            },
        }
    }
}

/// Whether resource clients may substitute fallback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    Enabled,
    Disabled,
}

impl FallbackPolicy {
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            FallbackPolicy::Enabled
        } else {
            FallbackPolicy::Disabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == FallbackPolicy::Enabled
    }

    /// Resolve a live result, serving `fallback` on failure when enabled.
    ///
    /// With the fallback disabled the live error propagates unchanged. An
    /// error from `fallback` itself (e.g. unknown id) is returned as-is.
    pub fn resolve<T, F>(self, operation: &str, live: Result<T>, fallback: F) -> Result<Fetched<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let error = match live {
            Ok(data) => return Ok(Fetched::Live(data)),
            Err(e) => e,
        };

        tracing::warn!(operation, error = %error, "Live request failed");

        if !self.is_enabled() {
            return Err(error);
        }

        tracing::info!(operation, "Using fallback data");
        let data = fallback()?;
        Ok(Fetched::Degraded {
            data,
            reason: error.to_string(),
        })
    }
}

/// Fallback lookup result for a missing entity.
pub(crate) fn not_found(what: &str, id: &str) -> ClientError {
    ClientError::NotFound(format!("{} with ID {} not found", what, id))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error taxonomy.
//!
//! Credential rejections from login are not errors (see
//! [`crate::session::LoginOutcome`]). Everything below is what the gateway
//! and resource clients can surface to callers.

use crate::storage::StorageError;

/// Error type returned by the gateway and resource clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was received at all (connection refused, DNS, timeout).
    #[error("Network error - unable to connect to the server: {0}")]
    Network(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access forbidden")]
    Forbidden,

    /// The backend tried to bounce us to a third-party identity provider.
    #[error("Authentication required. Please login ({location})")]
    AuthRequired { location: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal client error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// True for errors that mean the credentials were missing or rejected.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized | ClientError::Forbidden | ClientError::AuthRequired { .. }
        )
    }

    /// True when the server could not be reached at all.
    pub fn is_network_error(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Forbidden => Some(403),
            ClientError::AuthRequired { .. } => Some(302),
            ClientError::NotFound(_) => Some(404),
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_classification() {
        assert!(ClientError::Unauthorized.is_auth_error());
        assert!(ClientError::Forbidden.is_auth_error());
        assert!(ClientError::AuthRequired {
            location: "https://accounts.google.com/o/oauth2".to_string()
        }
        .is_auth_error());

        assert!(!ClientError::Network("refused".to_string()).is_auth_error());
        assert!(!ClientError::NotFound("plan 1".to_string()).is_auth_error());
    }

    #[test]
    fn test_network_error_is_distinct_from_status_errors() {
        let err = ClientError::Network("connection refused".to_string());
        assert!(err.is_network_error());
        assert_eq!(err.status(), None);

        let err = ClientError::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert!(!err.is_network_error());
        assert_eq!(err.status(), Some(500));
    }
}

//! Session state types.

use crate::models::User;

/// Where the current session stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No token stored.
    Unauthenticated,
    /// A token is stored and the profile is still being (or could not be)
    /// fetched. Treated as probably authenticated.
    Resolving { user_id: Option<String> },
    Authenticated(User),
    /// The stored token was rejected at startup and has been purged.
    Invalid,
}

/// Observable session snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub state: SessionState,
    pub loading: bool,
}

impl Session {
    /// State before the startup auth check has run.
    pub fn initial() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            loading: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// True for authenticated sessions and token-bearing ones still resolving.
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self.state,
            SessionState::Authenticated(_) | SessionState::Resolving { .. }
        )
    }
}

/// Result of a credential login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl LoginOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolving_counts_as_authenticated() {
        let session = Session {
            state: SessionState::Resolving { user_id: None },
            loading: false,
        };
        assert!(session.is_authenticated());
        assert!(session.user().is_none());

        assert!(!Session::initial().is_authenticated());
        assert!(!Session {
            state: SessionState::Invalid,
            loading: false
        }
        .is_authenticated());
    }
}

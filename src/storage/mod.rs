//! Durable credential storage.
//!
//! The browser build of SkillShare kept tokens in `localStorage`; here the
//! same key/value contract sits behind [`CredentialStore`], with an in-memory
//! and a file-backed implementation.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::User;
use std::sync::Arc;

/// Storage keys as constants.
pub mod keys {
    pub const REFRESH_TOKEN: &str = "refreshToken";
    pub const USER_ID: &str = "userId";
    pub const USER: &str = "user";
}

/// Credential storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt credential file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Key/value storage that outlives a single session.
///
/// Implementations are shared across the gateway and the session store;
/// concurrent writers are last-writer-wins.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed view over a [`CredentialStore`].
///
/// Every caller goes through this so the token key is decided in one place.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn CredentialStore>,
    token_key: String,
}

impl Credentials {
    pub fn new(store: Arc<dyn CredentialStore>, token_key: impl Into<String>) -> Self {
        Self {
            store,
            token_key: token_key.into(),
        }
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(&self.token_key)
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(&self.token_key, token)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::REFRESH_TOKEN)
    }

    pub fn set_refresh_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(keys::REFRESH_TOKEN, token)
    }

    pub fn user_id(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::USER_ID)
    }

    pub fn set_user_id(&self, user_id: &str) -> Result<(), StorageError> {
        self.store.set(keys::USER_ID, user_id)
    }

    /// Cache the profile under the `user` key for other readers of the store.
    pub fn set_cached_user(&self, user: &User) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        self.store.set(keys::USER, &raw)
    }

    /// Whether a bearer token is currently stored.
    pub fn has_token(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    /// Drop every credential entry.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.remove_all(&[
            self.token_key.as_str(),
            keys::REFRESH_TOKEN,
            keys::USER_ID,
            keys::USER,
        ])
    }

    /// Drop the access token and identity, keeping the refresh token.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.remove_all(&[self.token_key.as_str(), keys::USER_ID, keys::USER])
    }

    /// Attempt every removal; report the first failure afterwards.
    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove credential");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

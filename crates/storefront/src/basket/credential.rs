//! Stored access-token slot.

use std::sync::Arc;

use sentrobuv_core::AccessToken;
use tracing::{info, warn};

use crate::storage::{KeyValueStore, StorageError};

/// Reads and clears the access token kept in the key-value store.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl CredentialStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Current access token, if one is stored and usable.
    ///
    /// A storage read failure is logged and treated as signed out.
    #[must_use]
    pub fn token(&self) -> Option<AccessToken> {
        match self.storage.get(&self.key) {
            Ok(raw) => raw.as_deref().and_then(AccessToken::from_stored),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read stored credential");
                None
            }
        }
    }

    /// Store a credential as the sign-in flow would.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn store(&self, raw: &str) -> Result<(), StorageError> {
        self.storage.set(&self.key, raw)
    }

    /// Remove the stored credential.
    pub fn clear(&self) {
        match self.storage.remove(&self.key) {
            Ok(()) => info!(key = %self.key, "Cleared stored credential"),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to clear stored credential"),
        }
    }
}

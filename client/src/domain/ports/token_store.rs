//! Driven port for persisting the bearer token across runs.

use std::sync::{Mutex, PoisonError};

use super::define_port_error;
use crate::domain::AccessToken;

define_port_error! {
    /// Errors surfaced while reading or writing the persisted token.
    pub enum TokenStoreError {
        /// Underlying storage failed.
        Io { message: String } => "token storage failed: {message}",
    }
}

/// Port for the persisted token slot.
///
/// Storage is local and fast, so the port is synchronous.
pub trait TokenStore: Send + Sync {
    /// Load the persisted token, if any.
    fn load(&self) -> Result<Option<AccessToken>, TokenStoreError>;

    /// Replace the persisted token.
    fn save(&self, token: &AccessToken) -> Result<(), TokenStoreError>;

    /// Remove the persisted token. Removing an absent token succeeds.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local token slot.
///
/// # Examples
/// ```
/// use wiki_client::domain::AccessToken;
/// use wiki_client::domain::ports::{MemoryTokenStore, TokenStore};
///
/// let store = MemoryTokenStore::default();
/// store.save(&AccessToken::new("t").unwrap()).unwrap();
/// assert!(store.load().unwrap().is_some());
/// store.clear().unwrap();
/// assert!(store.load().unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<AccessToken>>,
}

impl MemoryTokenStore {
    /// Start with `token` already persisted.
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AccessToken>, TokenStoreError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &AccessToken) -> Result<(), TokenStoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

//! Driven port for the one durable piece of client state: the auth token.
//!
//! Only the session store writes through this port. The transport reads it
//! before every request.

use std::sync::Mutex;

use crate::domain::AuthToken;

/// Errors raised by credential persistence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialStoreError {
    /// Reading the stored token failed.
    #[error("credential read failed: {message}")]
    Read { message: String },
    /// Writing or removing the stored token failed.
    #[error("credential write failed: {message}")]
    Write { message: String },
}

impl CredentialStoreError {
    /// Read failure.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Write or removal failure.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

/// Port for persisting the bearer token across restarts.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Return the stored token; `None` means logged out.
    fn load(&self) -> Result<Option<AuthToken>, CredentialStoreError>;

    /// Replace the stored token.
    fn save(&self, token: &AuthToken) -> Result<(), CredentialStoreError>;

    /// Remove the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), CredentialStoreError>;
}

/// Process-local store that forgets the token on exit.
///
/// # Examples
/// ```
/// use shortflix_client::domain::AuthToken;
/// use shortflix_client::domain::ports::{CredentialStore, InMemoryCredentialStore};
///
/// let store = InMemoryCredentialStore::default();
/// store.save(&AuthToken::new("abc").unwrap())?;
/// assert!(store.load()?.is_some());
/// store.clear()?;
/// assert!(store.load()?.is_none());
/// # Ok::<(), shortflix_client::domain::ports::CredentialStoreError>(())
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    token: Mutex<Option<AuthToken>>,
}

impl InMemoryCredentialStore {
    /// Store pre-seeded with a token, as if persisted by an earlier run.
    pub fn with_token(token: AuthToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<AuthToken>> {
        // A poisoned slot still holds a coherent Option.
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<AuthToken>, CredentialStoreError> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &AuthToken) -> Result<(), CredentialStoreError> {
        *self.slot() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.slot() = None;
        Ok(())
    }
}

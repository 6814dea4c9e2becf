//! Client-level error types.
//!
//! Session operations absorb most transport failures into state; the errors
//! here are what remains visible to callers.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{ApiError, CredentialStoreError};
use crate::domain::{LoginValidationError, RegistrationValidationError};

/// Failure category used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The credential is invalid or expired; handled by clearing the session.
    AuthRejected,
    /// The initiating form should show the message verbatim.
    Validation,
    /// Network or server trouble; logged, state left intact.
    Transient,
    /// The client was wired incorrectly.
    Invariant,
}

/// Errors returned by [`crate::domain::SessionStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Login input failed local validation.
    #[error(transparent)]
    InvalidLogin(#[from] LoginValidationError),
    /// Registration input failed local validation.
    #[error(transparent)]
    InvalidRegistration(#[from] RegistrationValidationError),
    /// Another login or registration is still in flight.
    #[error("a login attempt is already in progress")]
    LoginInProgress,
    /// The operation needs an authenticated session.
    #[error("sign in to continue")]
    NotAuthenticated,
    /// Logout or a credential rejection ended the session mid-attempt.
    #[error("the session ended before sign-in completed")]
    SessionEnded,
    /// The persisted credential could not be written or removed.
    #[error(transparent)]
    Storage(#[from] CredentialStoreError),
    /// The service call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionError {
    /// Map the failure onto the client-wide error taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidLogin(_) | Self::InvalidRegistration(_) => ErrorCategory::Validation,
            Self::LoginInProgress => ErrorCategory::Invariant,
            Self::NotAuthenticated | Self::SessionEnded => ErrorCategory::AuthRejected,
            Self::Storage(_) => ErrorCategory::Transient,
            Self::Api(error) => error.category(),
        }
    }

    /// Text to show on the initiating form, for validation-class failures only.
    ///
    /// # Examples
    /// ```
    /// use shortflix_client::domain::{RegistrationValidationError, SessionError};
    ///
    /// let err = SessionError::from(RegistrationValidationError::PasswordMismatch);
    /// assert_eq!(err.user_message().as_deref(), Some("Passwords do not match"));
    /// ```
    pub fn user_message(&self) -> Option<String> {
        (self.category() == ErrorCategory::Validation).then(|| self.to_string())
    }
}

/// Errors raised while wiring components together at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WiringError {
    /// The transport already has a rejection listener.
    #[error("a rejection listener is already registered")]
    ListenerAlreadyRegistered,
    /// Settings could not be turned into a working client.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl WiringError {
    /// Build an [`WiringError::InvalidConfiguration`].
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

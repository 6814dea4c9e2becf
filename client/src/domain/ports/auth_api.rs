//! Driven port for the account and token endpoints.
//!
//! The session store drives this port; the HTTP adapter attaches the stored
//! credential on its own, so no method takes a token.

use async_trait::async_trait;

use super::ApiError;
use crate::domain::{AuthToken, Identity, LoginCredentials, Registration, UserId};

/// Port for account creation, token exchange and the identity probe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange a username/password pair for a fresh token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, ApiError>;

    /// Create an account. Does not sign in.
    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;

    /// Invalidate the current token server-side.
    async fn logout(&self) -> Result<(), ApiError>;

    /// Resolve the identity behind the current token.
    async fn current_user(&self) -> Result<Identity, ApiError>;
}

/// Fixture accepting `admin` / `password1` and rejecting everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthApi;

impl FixtureAuthApi {
    const TOKEN: &'static str = "fixture-token";

    fn identity() -> Identity {
        Identity {
            id: UserId::new(1),
            username: "admin".to_owned(),
            email: "admin@shortflix.invalid".to_owned(),
        }
    }
}

#[async_trait]
impl AuthApi for FixtureAuthApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, ApiError> {
        if credentials.username() == "admin" && credentials.password() == "password1" {
            AuthToken::new(Self::TOKEN).ok_or_else(|| ApiError::decode("fixture token is blank"))
        } else {
            Err(ApiError::validation(
                "non_field_errors: Unable to log in with provided credentials.",
            ))
        }
    }

    async fn register(&self, _registration: &Registration) -> Result<(), ApiError> {
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn current_user(&self) -> Result<Identity, ApiError> {
        Ok(Self::identity())
    }
}

//! HTTP adapter for the account and token endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

use super::dto::{IdentityDto, LoginRequestDto, RegisterRequestDto, TokenDto};
use super::transport::AuthorizedTransport;
use crate::domain::ports::{ApiError, AuthApi};
use crate::domain::{AuthToken, Identity, LoginCredentials, Registration};

const LOGIN_PATH: &str = "auth/token/login/";
const LOGOUT_PATH: &str = "auth/token/logout/";
const USERS_PATH: &str = "auth/users/";
const CURRENT_USER_PATH: &str = "auth/users/me/";

/// `AuthApi` over the shared [`AuthorizedTransport`].
pub struct HttpAuthApi {
    transport: Arc<AuthorizedTransport>,
}

impl HttpAuthApi {
    /// Adapter sharing `transport` with the catalogue client.
    pub fn new(transport: Arc<AuthorizedTransport>) -> Self {
        Self { transport }
    }
}

pub(super) fn decode_json<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|error| ApiError::decode(format!("invalid {what} payload: {error}")))
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, ApiError> {
        let request = self
            .transport
            .request(Method::POST, LOGIN_PATH)?
            .json(&LoginRequestDto {
                username: credentials.username(),
                password: credentials.password(),
            });
        let body = self.transport.send(request).await?;
        let token: TokenDto = decode_json(&body, "token")?;
        AuthToken::new(token.auth_token).ok_or_else(|| ApiError::decode("service issued a blank token"))
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let request = self
            .transport
            .request(Method::POST, USERS_PATH)?
            .json(&RegisterRequestDto {
                username: registration.username(),
                email: registration.email(),
                password: registration.password(),
            });
        self.transport.send(request).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let request = self.transport.request(Method::POST, LOGOUT_PATH)?;
        self.transport.send(request).await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Identity, ApiError> {
        let request = self.transport.request(Method::GET, CURRENT_USER_PATH)?;
        let body = self.transport.send(request).await?;
        let identity: IdentityDto = decode_json(&body, "identity")?;
        Ok(identity.into())
    }
}

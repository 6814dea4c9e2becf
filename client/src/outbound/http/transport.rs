//! Reqwest transport that attaches the stored credential to every request.
//!
//! This adapter owns transport details only: URL resolution against the
//! service base, the `Authorization` header, timeout and HTTP error mapping,
//! and the credential-rejection signal. It never imports the session store;
//! the store registers itself through [`RejectionNotifier`].

use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use tracing::{debug, warn};

use super::dto::decode_error_body;
use crate::domain::WiringError;
use crate::domain::ports::{
    ApiError, CredentialStore, FieldErrors, RejectionListener, RejectionNotifier,
};

/// Shared HTTP client for the catalogue service.
pub struct AuthorizedTransport {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
    listener: OnceLock<Weak<dyn RejectionListener>>,
}

impl AuthorizedTransport {
    /// Build a transport rooted at `base_url` with an explicit request timeout.
    ///
    /// A base without a trailing slash is treated as a directory, so
    /// `http://host/api` and `http://host/api/` resolve paths identically.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        mut base_url: Url,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, reqwest::Error> {
        if !base_url.path().ends_with('/') {
            let directory = format!("{}/", base_url.path());
            base_url.set_path(&directory);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            credentials,
            listener: OnceLock::new(),
        })
    }

    /// Service root every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` (e.g. `shorts/`) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|error| ApiError::transport(format!("invalid endpoint {path}: {error}")))
    }

    /// Start a request with the current credential attached, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when `path` does not form a valid URL.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let builder = self.client.request(method, url);
        let token = match self.credentials.load() {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, "could not read credential; sending request unauthenticated");
                None
            }
        };
        Ok(match token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token.authorization_value()),
            None => builder,
        })
    }

    /// Send a prepared request and return the body of a successful response.
    ///
    /// On HTTP 401 the rejection listener runs before the error is returned.
    ///
    /// # Errors
    ///
    /// Maps transport failures and non-success statuses onto [`ApiError`].
    pub async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if status.is_success() {
            return Ok(body.to_vec());
        }

        let error = map_status_error(status, body.as_ref());
        if error.is_rejection() {
            self.signal_rejection();
        }
        Err(error)
    }

    fn signal_rejection(&self) {
        match self.listener.get().and_then(Weak::upgrade) {
            Some(listener) => listener.credential_rejected(),
            None => {
                debug!("no live rejection listener; clearing credential directly");
                if let Err(error) = self.credentials.clear() {
                    warn!(%error, "could not clear rejected credential");
                }
            }
        }
    }
}

impl RejectionNotifier for AuthorizedTransport {
    fn register_rejection_listener(
        &self,
        listener: Weak<dyn RejectionListener>,
    ) -> Result<(), WiringError> {
        self.listener
            .set(listener)
            .map_err(|_| WiringError::ListenerAlreadyRegistered)
    }
}

pub(super) fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::timeout(error.to_string())
    } else {
        ApiError::transport(error.to_string())
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let decoded = decode_error_body(body);
    let message = match &decoded {
        Some(decoded) => decoded.summary.clone(),
        None => {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                format!("status {}: {}", status.as_u16(), preview)
            }
        }
    };

    match status {
        StatusCode::UNAUTHORIZED => ApiError::rejected(message),
        StatusCode::FORBIDDEN => ApiError::forbidden(message),
        StatusCode::NOT_FOUND => ApiError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ApiError::timeout(message),
        _ if status.is_client_error() => ApiError::validation_with_fields(
            message,
            decoded.map(|decoded| decoded.fields).unwrap_or_else(FieldErrors::new),
        ),
        _ => ApiError::server(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

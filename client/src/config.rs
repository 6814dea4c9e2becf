//! Client settings loaded via OrthoConfig.
//!
//! Every field is optional; accessors fall back to the local development
//! defaults. Environment variables use the `SHORTFLIX_` prefix, e.g.
//! `SHORTFLIX_API_BASE_URL`.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::{DEFAULT_DEBOUNCE, QueryCoordinatorConfig, WiringError};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const TOKEN_DIR: &str = ".shortflix";
const TOKEN_FILE: &str = "auth_token";

fn default_token_path() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(TOKEN_DIR)
        .join(TOKEN_FILE)
}

/// Configuration values for the catalogue client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHORTFLIX")]
pub struct ClientSettings {
    /// Base URL of the service API, including the `/api/` prefix.
    pub api_base_url: Option<String>,
    /// File holding the persisted auth token.
    pub token_path: Option<PathBuf>,
    /// Quiet period between the last filter edit and the listing query.
    pub debounce_ms: Option<u64>,
    /// Per-request timeout.
    pub request_timeout_secs: Option<u64>,
}

impl ClientSettings {
    /// Parsed API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::InvalidConfiguration`] for an unparsable URL.
    pub fn api_base_url(&self) -> Result<Url, WiringError> {
        let raw = self
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(raw).map_err(|error| {
            WiringError::invalid_configuration(format!("api_base_url {raw:?}: {error}"))
        })
    }

    /// Token file location, defaulting to `~/.shortflix/auth_token`.
    pub fn token_path(&self) -> PathBuf {
        self.token_path.clone().unwrap_or_else(default_token_path)
    }

    /// Quiet period before a filter edit is queried.
    pub fn debounce(&self) -> Duration {
        self.debounce_ms
            .map_or(DEFAULT_DEBOUNCE, Duration::from_millis)
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Listing coordinator tuning derived from these settings.
    pub fn coordinator_config(&self) -> QueryCoordinatorConfig {
        QueryCoordinatorConfig {
            debounce: self.debounce(),
        }
    }
}

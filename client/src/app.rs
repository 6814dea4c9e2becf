//! Process-wide wiring of the client components.
//!
//! Exactly one credential store, transport, session store and query
//! coordinator exist per client. The session store registers itself as the
//! transport's rejection listener during wiring; a second registration aborts
//! startup.

use std::sync::Arc;

use tracing::info;

use crate::config::ClientSettings;
use crate::domain::ports::{
    ApiError, AuthApi, CatalogueApi, CredentialStore, Navigator, RejectionNotifier,
};
use crate::domain::{
    FilterPatch, ListingSnapshot, QueryCoordinator, QueryCoordinatorConfig, QueryParams,
    SearchPanel, SessionError, SessionStore, Short, ShortDraft, ViewStateRouter, WiringError,
};
use crate::outbound::http::{AuthorizedTransport, HttpAuthApi, HttpCatalogueApi};
use crate::outbound::navigation::MemoryHistory;
use crate::outbound::storage::FileCredentialStore;

/// Adapters the client is assembled from.
pub struct ClientPorts {
    /// Account and token endpoints.
    pub auth: Arc<dyn AuthApi>,
    /// Listing and upload endpoints.
    pub catalogue: Arc<dyn CatalogueApi>,
    /// Durable token storage.
    pub credentials: Arc<dyn CredentialStore>,
    /// Source of credential-rejected signals, usually the transport.
    pub notifier: Arc<dyn RejectionNotifier>,
    /// Location the overlay is derived from.
    pub navigator: Arc<dyn Navigator>,
}

/// The assembled client.
pub struct ShortflixClient {
    session: Arc<SessionStore>,
    catalogue: Arc<dyn CatalogueApi>,
    listing: Arc<QueryCoordinator>,
    router: ViewStateRouter,
    search: SearchPanel,
}

impl ShortflixClient {
    /// Build the HTTP-backed client described by `settings`.
    ///
    /// `initial_query` seeds the navigation history, so a shared link such as
    /// `?video=4` reopens the overlay.
    ///
    /// # Errors
    ///
    /// Fails on invalid settings or when the component graph cannot be wired.
    pub fn from_settings(
        settings: &ClientSettings,
        initial_query: QueryParams,
    ) -> Result<Self, WiringError> {
        let base_url = settings.api_base_url()?;
        let credentials: Arc<dyn CredentialStore> = Arc::new(
            FileCredentialStore::new(settings.token_path())
                .map_err(|error| WiringError::invalid_configuration(error.to_string()))?,
        );
        let transport = Arc::new(
            AuthorizedTransport::new(base_url, settings.request_timeout(), credentials.clone())
                .map_err(|error| {
                    WiringError::invalid_configuration(format!("http client: {error}"))
                })?,
        );
        info!(base_url = %transport.base_url(), "catalogue client configured");

        Self::wire(
            ClientPorts {
                auth: Arc::new(HttpAuthApi::new(transport.clone())),
                catalogue: Arc::new(HttpCatalogueApi::new(transport.clone())),
                credentials,
                notifier: transport,
                navigator: Arc::new(MemoryHistory::new(initial_query)),
            },
            settings.coordinator_config(),
        )
    }

    /// Assemble the client from arbitrary adapters.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::ListenerAlreadyRegistered`] when the notifier
    /// already serves another session store.
    pub fn wire(ports: ClientPorts, config: QueryCoordinatorConfig) -> Result<Self, WiringError> {
        let session = SessionStore::new(ports.auth, ports.credentials, ports.notifier.as_ref())?;
        let listing = Arc::new(QueryCoordinator::new(ports.catalogue.clone(), config));
        Ok(Self {
            session,
            catalogue: ports.catalogue,
            search: SearchPanel::new(listing.clone()),
            listing,
            router: ViewStateRouter::new(ports.navigator),
        })
    }

    /// The process-wide session store.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// The catalogue listing and its filters.
    pub fn listing(&self) -> &Arc<QueryCoordinator> {
        &self.listing
    }

    /// Playback overlay state.
    pub fn router(&self) -> &ViewStateRouter {
        &self.router
    }

    /// Expandable search panel over the listing.
    pub fn search(&mut self) -> &mut SearchPanel {
        &mut self.search
    }

    /// Restore the session, then issue the first listing query.
    pub async fn start(&self) {
        self.session.initialize().await;
        self.listing.mount();
    }

    /// Apply `patch` and query at once, skipping the quiet period, then wait
    /// for the result.
    ///
    /// # Errors
    ///
    /// Returns the query's error when it failed.
    pub async fn search_now(&self, patch: FilterPatch) -> Result<ListingSnapshot, ApiError> {
        self.listing.set_filter(patch);
        self.listing.refresh();
        self.settled_listing().await
    }

    /// Wait until the latest issued listing query has resolved.
    ///
    /// # Errors
    ///
    /// Returns the query's error when the latest query failed.
    pub async fn settled_listing(&self) -> Result<ListingSnapshot, ApiError> {
        let mut changes = self.listing.subscribe();
        let snapshot = changes
            .wait_for(|state| state.issued > 0 && !state.loading)
            .await
            .map_err(|_| ApiError::transport("listing state closed"))?
            .clone();
        match &snapshot.last_error {
            Some(error) if snapshot.applied < snapshot.issued => Err(error.clone()),
            _ => Ok(snapshot),
        }
    }

    /// Upload a short as the signed-in user and refresh the listing.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotAuthenticated`] without a session; draft and
    /// service failures otherwise.
    pub async fn upload(&self, draft: &ShortDraft) -> Result<Short, SessionError> {
        let owner = self.session.require_identity()?;
        draft
            .validate()
            .map_err(|error| ApiError::validation(error.to_string()))?;
        let created = self.catalogue.create_short(draft).await?;
        info!(id = %created.id, owner = %owner.username, "short uploaded");
        self.listing.refresh();
        Ok(created)
    }

    /// Cancel the pending debounce timer.
    pub fn shutdown(&self) {
        self.listing.shutdown();
    }
}

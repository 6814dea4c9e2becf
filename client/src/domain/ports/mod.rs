//! Domain ports and supporting types for the client's adapters.
//!
//! Every collaborator outside the process (catalogue service, durable token
//! storage, the address bar) is reached through one of these traits.

mod api_error;
mod auth_api;
mod catalogue_api;
mod credential_store;
mod navigation;
mod rejection;

pub use api_error::{ApiError, FieldErrors};
#[cfg(test)]
pub use auth_api::MockAuthApi;
pub use auth_api::{AuthApi, FixtureAuthApi};
#[cfg(test)]
pub use catalogue_api::MockCatalogueApi;
pub use catalogue_api::{CatalogueApi, FixtureCatalogueApi};
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError, InMemoryCredentialStore};
#[cfg(test)]
pub use navigation::MockNavigator;
pub use navigation::Navigator;
#[cfg(test)]
pub use rejection::MockRejectionNotifier;
pub use rejection::{RejectionListener, RejectionNotifier};

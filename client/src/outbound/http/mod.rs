//! HTTP adapters for the catalogue service.
//!
//! One [`AuthorizedTransport`] is shared by both clients so every request
//! sees the same credential and the same rejection listener.

mod auth_client;
mod catalogue_client;
mod dto;
mod transport;

pub use auth_client::HttpAuthApi;
pub use catalogue_client::HttpCatalogueApi;
pub use transport::AuthorizedTransport;

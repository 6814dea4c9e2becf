//! Catalogue client library: session lifecycle, debounced search and the
//! URL-derived playback overlay, with HTTP, file and history adapters.

pub mod app;
pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use app::{ClientPorts, ShortflixClient};
pub use config::ClientSettings;

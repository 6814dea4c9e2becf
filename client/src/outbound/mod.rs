//! Outbound adapters implementing the domain ports.
//!
//! - `http`: reqwest clients for the catalogue and account endpoints.
//! - `storage`: the persisted auth token.
//! - `navigation`: an in-process history stack standing in for the address bar.

pub mod http;
pub mod navigation;
pub mod storage;

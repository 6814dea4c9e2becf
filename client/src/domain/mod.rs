//! Domain primitives and client state machines.
//!
//! Purpose: hold everything the client decides on its own, independent of
//! HTTP, disk or a terminal. Adapters reach the outside world through the
//! traits in [`ports`].
//!
//! Public surface:
//! - SessionStore: credential lifecycle and resolved identity.
//! - QueryCoordinator: debounced, last-issued-wins catalogue listing.
//! - ViewStateRouter: playback overlay derived from the `video` parameter.
//! - SearchPanel: expand/collapse rules for the filter inputs.

pub mod ports;

mod auth;
mod error;
mod filter;
mod identity;
mod query_coordinator;
mod search_panel;
mod session;
mod short;
mod upload;
mod view_state;

pub use self::auth::{
    AuthToken, LoginCredentials, LoginValidationError, MIN_PASSWORD_LENGTH, Registration,
    RegistrationValidationError,
};
pub use self::error::{ErrorCategory, SessionError, WiringError};
pub use self::filter::{FilterField, FilterPatch, FilterSet};
pub use self::identity::{Identity, UserId};
pub use self::query_coordinator::{
    DEFAULT_DEBOUNCE, ListingSnapshot, QueryCoordinator, QueryCoordinatorConfig,
};
pub use self::search_panel::{PanelState, SearchPanel};
pub use self::session::{SessionPhase, SessionSnapshot, SessionStore};
pub use self::short::{OwnerRef, Short, ShortId};
pub use self::upload::{MediaFile, ShortDraft, UploadValidationError};
pub use self::view_state::{QueryParams, SELECTION_PARAM, ViewStateRouter};

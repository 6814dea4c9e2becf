//! Callback contract between the transport and the session store.
//!
//! The transport never imports the session store. The store registers itself
//! as the single listener when it is built, and the transport calls it
//! synchronously whenever the service rejects the attached credential.

use std::sync::Weak;

use crate::domain::WiringError;

/// Receiver of "credential rejected" signals.
pub trait RejectionListener: Send + Sync {
    /// Drop the current credential and identity. Must not block on I/O.
    fn credential_rejected(&self);
}

/// Source of "credential rejected" signals.
#[cfg_attr(test, mockall::automock)]
pub trait RejectionNotifier: Send + Sync {
    /// Register the one listener. A second registration is a wiring error.
    fn register_rejection_listener(
        &self,
        listener: Weak<dyn RejectionListener>,
    ) -> Result<(), WiringError>;
}

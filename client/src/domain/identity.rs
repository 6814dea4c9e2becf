//! The resolved profile of the signed-in user.

use std::fmt;

/// Numeric account identifier assigned by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw account id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw account id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User profile tied to a valid credential.
///
/// Only the session store holds one, and only after a successful probe with
/// the current credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account id.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Contact address; empty when the service omits it.
    pub email: String,
}

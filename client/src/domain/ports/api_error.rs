//! Error type shared by every port that talks to the catalogue service.
//!
//! Adapters translate transport failures and HTTP statuses into these
//! variants; domain services only ever see this enum.

use std::collections::BTreeMap;

use crate::domain::ErrorCategory;

/// Per-field validation messages returned by the service.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Errors surfaced while calling the catalogue/auth service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The service rejected the attached credential (HTTP 401).
    #[error("credential rejected: {message}")]
    Rejected { message: String },
    /// The service refused the payload; `fields` carries per-field messages.
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },
    /// Authenticated but not permitted (HTTP 403).
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    /// The addressed resource does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },
    /// The call exceeded its timeout.
    #[error("request timed out: {message}")]
    Timeout { message: String },
    /// Network transport failed before a response arrived.
    #[error("transport failed: {message}")]
    Transport { message: String },
    /// The service answered with a server fault.
    #[error("server error: {message}")]
    Server { message: String },
    /// The response body could not be decoded.
    #[error("response decode failed: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// Credential refused by the service.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Validation failure with a summary and no field breakdown.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::validation_with_fields(message, FieldErrors::new())
    }

    /// Validation failure carrying the per-field breakdown.
    pub fn validation_with_fields(message: impl Into<String>, fields: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    /// Authenticated but not allowed.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Missing resource.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Call exceeded its deadline.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Connection-level failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Server-side fault.
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Undecodable response body.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Return whether the service rejected the credential.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Map the failure onto the client-wide error taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Rejected { .. } => ErrorCategory::AuthRejected,
            Self::Validation { .. } | Self::Forbidden { .. } | Self::NotFound { .. } => {
                ErrorCategory::Validation
            }
            Self::Timeout { .. }
            | Self::Transport { .. }
            | Self::Server { .. }
            | Self::Decode { .. } => ErrorCategory::Transient,
        }
    }

    /// Per-field messages for validation failures, empty otherwise.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }
}

//! Error types for protocast.
//!
//! All errors are strongly typed using thiserror so callers can pattern match
//! on the exact failure instead of parsing messages.

use thiserror::Error;

use crate::center::DeliveryFailure;
use crate::protocol::ProtocolId;

/// Validation errors raised while building filters or configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid filter: {reason}")]
    InvalidFilter {
        reason: String,
    },

    #[error("Invalid filter pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        field: String,
        max_length: usize,
    },
}

/// Errors raised by the registration table or the default-center lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registry lock poisoned: {context}")]
    LockPoisoned {
        context: &'static str,
    },

    #[error("Default notification center is already initialized")]
    DefaultAlreadyInitialized,
}

/// Top-level error type for protocast.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("{} of {attempted} deliveries failed for protocol {protocol}", failures.len())]
    Delivery {
        protocol: ProtocolId,
        attempted: usize,
        failures: Vec<DeliveryFailure>,
    },
}

impl NotifyError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a registry error.
    #[must_use]
    pub const fn is_registry(&self) -> bool {
        matches!(self, Self::Registry(_))
    }

    /// Returns true if this error aggregates per-observer delivery failures.
    #[must_use]
    pub const fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery { .. })
    }

    /// The per-observer failures carried by a delivery error.
    #[must_use]
    pub fn delivery_failures(&self) -> &[DeliveryFailure] {
        match self {
            Self::Delivery { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Result type alias for protocast operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

//! Unified error types for the booking and payment engine.
//!
//! Business-rule violations are modeled as dedicated variants so callers can
//! distinguish bad input (`Validation`), missing or foreign rows (`NotFound`),
//! transitions that are not permitted from the current status (`InvalidState`,
//! `AlreadyCancelled`) and races detected at the database (`Conflict`).
//! Everything else is an internal failure that rolls the transaction back.

use thiserror::Error;

/// Errors surfaced by configuration, persistence and business operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input, rejected before any write.
    #[error("validation failed: {message}")]
    Validation {
        /// Human-readable reason.
        message: String,
    },

    /// The target row does not exist or is not owned by the caller.
    #[error("{entity} not found")]
    NotFound {
        /// Name of the missing entity ("reservation", "order", ...).
        entity: &'static str,
    },

    /// The operation is not permitted from the target's current status.
    #[error("operation not permitted in current status: {current}")]
    InvalidState {
        /// The status the target was actually in.
        current: String,
    },

    /// Cancellation requested for a target that is already cancelled.
    #[error("already cancelled")]
    AlreadyCancelled,

    /// Duplicate reservation slot, or a concurrent mutation lost the race.
    #[error("conflict: {message}")]
    Conflict {
        /// Human-readable reason.
        message: String,
    },

    /// Configuration error (bad environment values, missing settings).
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable reason.
        message: String,
    },

    /// Unexpected database failure.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// True for failures that should be reported to clients as a generic
    /// internal error while the cause is logged server-side.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Io(_) | Self::Config { .. })
    }
}

/// Convenience `Result` type.
pub type Result<T> = std::result::Result<T, Error>;

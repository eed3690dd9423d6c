//! Shared Error Types
//!
//! This module defines the error taxonomy shared between the polling client
//! and the backend. Every fallible messaging operation resolves to one of
//! these categories.
//!
//! # Error Categories
//!
//! - `Validation` - malformed input (empty content, self-conversation)
//! - `Authorization` - caller is not a participant of the conversation
//! - `NotFound` - unknown conversation or message
//! - `Conflict` - a storage-level uniqueness violation that the upsert
//!   could not resolve
//! - `Transient` - I/O or network failure; the next poll tick retries
//!   implicitly, a failed send must be resent explicitly by the caller
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread
//! boundaries.
use thiserror::Error;

/// Shared error types that can occur in both the client and the backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessagingError {
    /// Data validation error
    #[error("validation error in field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Caller is not a participant of the conversation
    #[error("authorization error: {message}")]
    Authorization {
        /// Human-readable error message
        message: String,
    },

    /// Unknown conversation or message
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// Duplicate-conversation race that the storage layer failed to resolve
    #[error("conflict: {message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// I/O or network failure
    #[error("transient failure: {message}")]
    Transient {
        /// Human-readable error message
        message: String,
    },
}

impl MessagingError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new authorization error
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new transient error
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Whether retrying the operation can succeed without caller changes
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Database failures surface as transient errors; not-found and
/// authorization outcomes are decided by explicit checks, never inferred
/// from driver errors.
impl From<sqlx::Error> for MessagingError {
    fn from(err: sqlx::Error) -> Self {
        Self::transient(format!("database error: {}", err))
    }
}

impl From<reqwest::Error> for MessagingError {
    fn from(err: reqwest::Error) -> Self {
        Self::transient(format!("network error: {}", err))
    }
}

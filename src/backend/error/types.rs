//! Backend Error Types
//!
//! This module defines error types specific to the backend server. These
//! errors are used in HTTP handlers and can be converted to HTTP
//! responses.
//!
//! # Error Categories
//!
//! - `Unauthorized` - the request carried no usable bearer principal
//! - `Messaging` - a messaging-domain failure (validation, authorization,
//!   not-found, conflict, transient), mapped to its HTTP status
//! - `Serialization` - JSON encoding/decoding failure

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::MessagingError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Missing or malformed bearer principal
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message
        message: String,
    },

    /// Messaging-domain error (from the conversation service)
    #[error(transparent)]
    Messaging(#[from] MessagingError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Messaging(err) => match err {
                MessagingError::Validation { .. } => StatusCode::BAD_REQUEST,
                MessagingError::Authorization { .. } => StatusCode::FORBIDDEN,
                MessagingError::NotFound { .. } => StatusCode::NOT_FOUND,
                MessagingError::Conflict { .. } => StatusCode::CONFLICT,
                MessagingError::Transient { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

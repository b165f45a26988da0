/**
 * Backend Error Types
 *
 * One error type for every HTTP handler. Each variant maps to a fixed status
 * code and is rendered as `{"error": ..., "status": ...}` by the
 * `IntoResponse` impl in `conversion.rs`.
 *
 * # Error Categories
 *
 * | Variant        | Status |
 * |----------------|--------|
 * | `NotFound`     | 404    |
 * | `Forbidden`    | 403    |
 * | `Validation`   | 400    |
 * | `Conflict`     | 409    |
 * | `Unauthorized` | 401    |
 * | `Internal`     | 500    |
 *
 * Denials from the authorization gate, store failures and payload validation
 * errors convert into these with `?`.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::authorization::{DenyKind, DenyReason};
use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use circle_chat::backend::error::BackendError;
///
/// let err = BackendError::not_found("Group not found");
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// The addressed resource does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The caller is known but not allowed to do this
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// The request itself is invalid
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The request conflicts with current state
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Missing or invalid credentials
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Anything the caller cannot fix
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BackendError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Internal error. The detail is logged; clients see a generic message.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!("[Backend] Internal error: {}", detail);
        Self::Internal {
            message: "Server error".to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { message }
            | Self::Forbidden { message }
            | Self::Validation { message }
            | Self::Conflict { message }
            | Self::Unauthorized { message }
            | Self::Internal { message } => message.clone(),
        }
    }
}

impl From<DenyReason> for BackendError {
    fn from(reason: DenyReason) -> Self {
        let message = reason.to_string();
        match reason.kind() {
            DenyKind::Forbidden => Self::Forbidden { message },
            DenyKind::Conflict => Self::Conflict { message },
            DenyKind::Validation => Self::Validation { message },
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => Self::conflict(format!("{} already exists", what)),
            other => Self::internal(other),
        }
    }
}

impl From<SharedError> for BackendError {
    fn from(err: SharedError) -> Self {
        match &err {
            SharedError::ValidationError { message, .. } => Self::validation(message.clone()),
            SharedError::SerializationError { .. } => Self::validation(err.to_string()),
        }
    }
}

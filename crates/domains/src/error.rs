//! # AppError
//!
//! Centralized error handling for the microblog.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all service operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// The `api-key` header was absent on an endpoint that needs it.
    #[error("Please, provide http-header 'api-key' in your request")]
    MissingCredential,

    /// The `api-key` header does not belong to any user. The key itself is
    /// kept out of the message.
    #[error("No user is registered for the supplied api-key")]
    UnknownCredential,

    /// Resource not found (e.g., User, Tweet, Like)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Tweet deletion refused. Deliberately says nothing about whether the
    /// tweet exists.
    #[error("User does not have permission to delete the tweet")]
    PermissionDenied,

    /// Validation failure (e.g., empty tweet, self-follow)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Infrastructure failure (e.g., DB down, disk full)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        AppError::NotFound(entity.to_string(), id.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{err:#}"))
    }
}

/// A specialized Result type for microblog logic.
pub type Result<T> = std::result::Result<T, AppError>;

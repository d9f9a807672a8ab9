use thiserror::Error;

use crate::generation::GenerationError;

/// Failures of the chat workflows.
///
/// The first four variants are caller errors and map one-to-one onto HTTP
/// statuses; the rest are internal.
#[derive(Debug, Error)]
pub enum AppCoreError {
    /// Required input is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No session (or no populated user, where one is required).
    #[error("authentication required")]
    Unauthenticated,

    /// The caller is authenticated but does not own the resource.
    #[error("caller does not own chat {0}")]
    Forbidden(String),

    /// The referenced chat does not exist.
    #[error("chat {0} not found")]
    NotFound(String),

    /// A write would change the author of an existing chat.
    #[error("chat {0} belongs to another author")]
    Conflict(String),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

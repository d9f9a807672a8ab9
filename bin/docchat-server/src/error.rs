//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`]. Error bodies are plain-text reasons, the
//! format the browser client expects.
//!
//! **Security note:** internal errors (generation, database) are logged with
//! full detail but only a generic message is returned to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docchat_app_core::AppCoreError;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the docchat-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No (usable) session accompanied the request.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller is known but may not touch this resource.
    #[error("forbidden")]
    Forbidden,

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The write would take over another author's chat.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AppCoreError> for ServerError {
    fn from(e: AppCoreError) -> Self {
        match e {
            AppCoreError::Validation(m) => ServerError::BadRequest(m),
            AppCoreError::Unauthenticated => ServerError::Unauthorized,
            AppCoreError::Forbidden(_) => ServerError::Forbidden,
            AppCoreError::NotFound(_) => ServerError::NotFound("Chat not found".into()),
            AppCoreError::Conflict(id) => ServerError::Conflict(id),
            AppCoreError::Database(e) => ServerError::Database(e),
            AppCoreError::Generation(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
            // The browser client shows the same text for 401 and 403.
            ServerError::Forbidden => (StatusCode::FORBIDDEN, "Unauthorized".to_owned()),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::Conflict(_) => (
                StatusCode::CONFLICT,
                "Chat belongs to another user".to_owned(),
            ),

            // Internal errors: log the full detail, return a generic message.
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };
        (status, client_message).into_response()
    }
}

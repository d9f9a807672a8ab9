use thiserror::Error;

/// Errors returned by [`HistoryApi`](crate::HistoryApi) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the credential (HTTP 401).
    #[error("not signed in")]
    Unauthorized,

    /// Any other non-success status, with the plain-text body the server sent.
    #[error("server returned {0}: {1}")]
    Status(u16, String),

    /// The request could not be sent or the response could not be decoded.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured server address cannot be used as a base URL.
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
}

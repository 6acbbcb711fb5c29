//! Error types for the terminal client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server could not be reached at all.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The requested chat does not exist on the server.
    #[error("Chat '{0}' not found")]
    ChatNotFound(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::Connection(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

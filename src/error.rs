//! Error types for the FReD client

use thiserror::Error;

/// Errors that can occur when talking to a FReD node
#[derive(Error, Debug)]
pub enum Error {
    /// Network or connection error (refused, DNS failure, reset)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request did not complete within the configured timeout
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Server answered with a non-2xx status
    #[error("Request failed (status {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body as sent by the server
        body: String,
    },

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be assembled
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be read or decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status code for errors caused by a non-2xx response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

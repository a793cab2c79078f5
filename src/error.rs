//! Error types for the platform client

use thiserror::Error;

/// Result alias used by every client operation
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the platform client
#[derive(Error, Debug)]
pub enum Error {
    /// The request could not be built (bad base URL, bad header, missing endpoint)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, DNS, I/O or timeout failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service answered with a status outside 200..=299
    #[error("{}", status_message(.status, .body))]
    Status { status: u16, body: String },

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("No available cluster")]
    NoDefaultCluster,

    #[error("OS type {0} not supported")]
    UnsupportedOs(String),
}

impl Error {
    /// Status code of a non-2xx response, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the transport gave up because the request timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(e) if e.is_timeout())
    }
}

fn status_message(status: &u16, body: &str) -> String {
    let reason = body.trim();
    if reason.is_empty() {
        format!("Status code is {}", status)
    } else {
        format!("Status code is {}, reason {}", status, reason)
    }
}

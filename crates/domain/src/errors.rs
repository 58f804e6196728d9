//! Error types used throughout the workspace

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the Ping Intelligence clients
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum PingError {
    #[error("No auth token found for {product}. Tried: {}", .attempted.join("; "))]
    CredentialNotFound { product: String, attempted: Vec<String> },

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Timed out after {elapsed:?} waiting for job {job_id}")]
    Timeout { job_id: String, elapsed: Duration },

    #[error("Job {job_id} finished with {status}: {message}")]
    JobFailed { job_id: String, status: String, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl PingError {
    /// Whether a retry of the same request may succeed.
    ///
    /// Network failures, throttling (429) and server-side errors (5xx) are
    /// transient; everything else reflects caller input or a final outcome.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Transport { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status carried by a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PingError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PingError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Result type alias for Ping Intelligence operations
pub type Result<T> = std::result::Result<T, PingError>;

//! Common error types for the status board

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Common result type for status board operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two backend fetches an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchTarget {
    /// `GET /api/data.json`
    Brigades,
    /// `GET /api/tags.json`
    Tags,
}

impl FetchTarget {
    /// Path of the endpoint relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            FetchTarget::Brigades => "/api/data.json",
            FetchTarget::Tags => "/api/tags.json",
        }
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Brigades => write!(f, "brigades"),
            FetchTarget::Tags => write!(f, "tags"),
        }
    }
}

/// Common error types across the status board crates
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure talking to the backend API
    #[error("Fetch error ({target}): {message}")]
    Fetch { target: FetchTarget, message: String },

    /// Backend answered with a non-success status
    #[error("HTTP {status} fetching {target}")]
    Http { target: FetchTarget, status: u16 },

    /// Response body did not match the expected schema
    #[error("Decode error ({target}): {message}")]
    Decode { target: FetchTarget, message: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// The fetch this error came from, if it is a transport-level error
    pub fn fetch_target(&self) -> Option<FetchTarget> {
        match self {
            Error::Fetch { target, .. }
            | Error::Http { target, .. }
            | Error::Decode { target, .. } => Some(*target),
            _ => None,
        }
    }
}

//! Error types for deployment operations.
//!
//! The taxonomy mirrors how failures propagate: configuration problems are
//! caught before any network call, vendor failures carry the vendor-supplied
//! message, and a poller that runs out of attempts reports a timeout that is
//! deliberately distinct from a vendor failure (the resource may still be
//! provisioning).

use std::io;
use std::path::PathBuf;

/// Result type alias for modelport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling or invoking a deployment.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or unmergeable configuration. Surfaced to the caller
    /// before any network call is made.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A vendor check/create/update operation failed.
    #[error("{message}")]
    Vendor {
        /// Vendor-supplied message, or a generic per-operation default.
        message: String,
    },

    /// HTTP transport failure.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// IO error during cache persistence.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The poller exhausted its attempt budget without observing a terminal
    /// vendor status. The resource is not known to be broken, only not yet
    /// confirmed; callers may re-poll instead of re-provisioning.
    #[error("deployment of {name} not confirmed after {attempts} attempts")]
    Timeout {
        /// Resource name being polled.
        name: String,
        /// Attempt budget that was exhausted.
        attempts: u32,
    },
}

impl Error {
    /// Create a vendor error from a message.
    pub fn vendor(message: impl Into<String>) -> Self {
        Self::Vendor {
            message: message.into(),
        }
    }

    /// Create a configuration error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a poll timeout rather than a confirmed failure.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

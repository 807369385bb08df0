//! Error types for jukebot-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Failure reported by a playback backend
///
/// The coordinator treats every variant as recoverable: it reports the
/// failure and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend could not be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the request
    #[error("backend rejected request: {0}")]
    Rejected(String),

    /// Backend did not answer in time
    #[error("backend timed out: {0}")]
    Timeout(String),
}

/// Main error type for jukebot-player
#[derive(Error, Debug)]
pub enum Error {
    /// Entry cannot be queued (non-positive duration, missing field)
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Backend play/pause call failed during an advance
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Search provider failure
    #[error("Search error: {0}")]
    Search(String),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors from the shared library
    #[error(transparent)]
    Common(#[from] jukebot_common::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using jukebot-player Error
pub type Result<T> = std::result::Result<T, Error>;

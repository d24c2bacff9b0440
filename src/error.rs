//! Unified error handling for the vestnik crate
//!
//! Run-level conflicts (`AlreadyRunning`, `NotRunning`) and interval
//! validation failures are the only errors that reach external callers.
//! Transient per-item failures inside the crawl pipeline are logged and
//! swallowed, never propagated.

use std::io;
use thiserror::Error;

/// Unified error type for the vestnik crate
#[derive(Error, Debug)]
pub enum Error {
    /// A crawl run is already in progress
    #[error("crawl is already in progress")]
    AlreadyRunning,

    /// No crawl run is currently in progress
    #[error("no crawl is currently running")]
    NotRunning,

    /// Auto-schedule interval string could not be parsed
    #[error("invalid interval format: {0}")]
    InvalidInterval(String),

    /// Auto-schedule interval must be non-zero
    #[error("interval must not be zero")]
    IntervalZero,

    /// Database errors
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Run-level conflict errors surface to API callers as named conditions
    /// rather than failures of the crawl itself.
    pub fn is_run_conflict(&self) -> bool {
        matches!(self, Self::AlreadyRunning | Self::NotRunning)
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

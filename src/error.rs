//! Error types for the companion-chat library.
//!
//! This module provides custom error types using `thiserror`. Only the reply
//! path can fail at runtime; the session store converts those failures into a
//! fallback chat message, so callers rarely see these outside of tests and
//! configuration loading.

use thiserror::Error;

/// Errors that can occur in the companion-chat application.
#[derive(Error, Debug)]
pub enum CompanionError {
    /// Transport-level failure talking to the reply endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reply endpoint answered with a non-success status
    #[error("Reply endpoint returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Reply resolution was cancelled before it completed
    #[error("Reply request {0} was cancelled")]
    Cancelled(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Result with `CompanionError`
pub type Result<T> = std::result::Result<T, CompanionError>;

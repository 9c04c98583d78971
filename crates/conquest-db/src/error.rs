//! Error types for the data layer.
//!
//! All store failures surface as [`DbError`]. A record that exists but does
//! not decode is not an error: readers log it and report the record as
//! absent.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization error while encoding a record for writing.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A scalar key holds something that is not the expected type.
    #[error("Invalid value at {key}: {reason}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

//! Error types for the tideline-core crate

use thiserror::Error;

/// Result type alias for tideline-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tideline-core
#[derive(Error, Debug)]
pub enum Error {
    /// History backend errors (remote store, transport)
    #[error("History error: {0}")]
    History(String),

    /// Malformed or inconsistent event data
    #[error("Event error: {0}")]
    Event(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Generic(String),
}

//! Error types for the tideline-tui crate

use std::io;
use thiserror::Error;

/// Result type alias for tideline-tui operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tideline-tui
#[derive(Error, Debug)]
pub enum Error {
    /// Terminal I/O errors
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// Channel communication errors
    #[error("Channel error: {0}")]
    Channel(String),

    /// Invalid UI state errors
    #[error("Invalid UI state: {0}")]
    InvalidState(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Core errors from tideline-core
    #[error("Core error: {0}")]
    Core(#[from] tideline_core::Error),
}

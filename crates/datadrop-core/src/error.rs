//! Error types for `datadrop` core library.

use thiserror::Error;

/// Result type alias using `datadrop` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `datadrop` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

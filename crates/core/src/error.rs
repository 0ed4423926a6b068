//! Error types for the grid-trader system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the grid-trader system.
///
/// Insolvency is deliberately not represented here: a fill that would
/// overdraw cash or position is recorded as a rejected order and the run
/// continues (see the portfolio ledger).
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (invalid bounds, counts, rates). Surfaces
    /// synchronously before any bar is processed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (malformed or out-of-order bar, bad input file). Aborts
    /// the run; runs are not resumable mid-stream.
    #[error("Data error: {0}")]
    Data(String),

    /// The run was cancelled through its cancellation token.
    #[error("Run cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }
}

//! Errors raised outside of orchestrated calls.

use thiserror::Error;

/// Error type for loading data and running the demo binaries.
#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be read.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The feature database is not valid JSON.
    #[error("failed to parse feature database: {0}")]
    Json(#[from] serde_json::Error),

    /// A command-line argument is missing or malformed.
    #[error("invalid argument: {0}")]
    Args(#[from] pico_args::Error),

    /// The server could not be started.
    #[error("server error: {0}")]
    Server(#[from] tonic::transport::Error),

    /// The orchestrator could not be configured or connected.
    #[error(transparent)]
    Orchestrator(#[from] call_orchestrator::Error),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for orchestrated calls.

use std::time::Duration;

use thiserror::Error;

/// Error type for orchestrated calls.
///
/// Every variant knows whether retrying the same call might succeed, see
/// [`Error::is_transient`]. Errors never escape an orchestrator operation;
/// they are folded into a [`CallOutcome`](crate::CallOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The connection could not be established, was reset, or is closed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The call did not complete before its deadline.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// The server answered with an application-level error status.
    #[error("remote service error ({code}): {message}")]
    Remote {
        /// Status code name reported by the server.
        code: String,
        /// Status message reported by the server.
        message: String,
        /// Whether the status code marks the failure as retryable.
        transient: bool,
    },

    /// The caller supplied input the call cannot be made with.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A message could not be decoded.
    #[error("failed to decode message: {0}")]
    Decode(String),

    /// The call was cancelled before it could complete.
    #[error("call cancelled: {0}")]
    Cancelled(String),
}

impl Error {
    /// Returns `true` if the same call might succeed when retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Connection(_) | Error::DeadlineExceeded(_) => true,
            Error::Remote { transient, .. } => *transient,
            Error::InvalidInput(_) | Error::Decode(_) | Error::Cancelled(_) => false,
        }
    }
}

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transience_follows_the_taxonomy() {
        assert!(Error::Connection("refused".into()).is_transient());
        assert!(Error::DeadlineExceeded(Duration::from_secs(5)).is_transient());
        assert!(!Error::InvalidInput("empty".into()).is_transient());
        assert!(!Error::Decode("truncated".into()).is_transient());
        assert!(!Error::Cancelled("shutdown".into()).is_transient());

        let remote = |transient| Error::Remote {
            code: "Aborted".into(),
            message: "try again".into(),
            transient,
        };
        assert!(remote(true).is_transient());
        assert!(!remote(false).is_transient());
    }

    #[test]
    fn display_keeps_the_reason_readable() {
        assert_eq!(
            Error::DeadlineExceeded(Duration::from_secs(6)).to_string(),
            "deadline of 6s exceeded"
        );
        assert_eq!(
            Error::Remote {
                code: "NotFound".into(),
                message: "no such route".into(),
                transient: false,
            }
            .to_string(),
            "remote service error (NotFound): no such route"
        );
    }
}

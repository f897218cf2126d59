//! The uniform result of every orchestrated call.

use crate::error::Error;
use crate::state::CallState;

/// Outcome of an orchestrated call.
///
/// Every orchestrator operation resolves to exactly one outcome, whatever
/// happened on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<T> {
    /// The call completed.
    Success(T),
    /// The call failed.
    Failure(Failure),
}

/// Classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The connection could not be used.
    Transport,
    /// The server answered with an error status.
    Remote,
    /// The call was made with input that cannot be sent or decoded.
    InvalidInput,
    /// The call was cancelled by its deadline or by channel shutdown.
    Cancelled,
}

/// Why a call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Classification of the failure.
    pub kind: FailureKind,
    /// Human-readable reason, safe to show to users.
    pub reason: String,
    /// Whether retrying the same call might succeed.
    pub is_transient: bool,
    /// The state the call was in when it failed.
    pub state: CallState,
}

impl Failure {
    /// Build a failure from an error observed while the call was in `state`.
    pub fn from_error(error: &Error, state: CallState) -> Self {
        let kind = match error {
            Error::Connection(_) => FailureKind::Transport,
            Error::Remote { .. } => FailureKind::Remote,
            Error::InvalidInput(_) | Error::Decode(_) => FailureKind::InvalidInput,
            Error::DeadlineExceeded(_) | Error::Cancelled(_) => FailureKind::Cancelled,
        };

        Self {
            kind,
            reason: error.to_string(),
            is_transient: error.is_transient(),
            state,
        }
    }
}

/// Message counts of a streaming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamStats {
    /// Messages written to the server.
    pub sent: usize,
    /// Messages read from the server.
    pub received: usize,
}

impl<T> CallOutcome<T> {
    /// Returns `true` if the call succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    /// Returns the payload of a successful call.
    pub fn success(self) -> Option<T> {
        match self {
            CallOutcome::Success(value) => Some(value),
            CallOutcome::Failure(_) => None,
        }
    }

    /// Returns the failure of a failed call.
    pub fn failure(self) -> Option<Failure> {
        match self {
            CallOutcome::Success(_) => None,
            CallOutcome::Failure(failure) => Some(failure),
        }
    }

    /// Borrow the failure of a failed call.
    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            CallOutcome::Success(_) => None,
            CallOutcome::Failure(failure) => Some(failure),
        }
    }

    /// Map the payload of a successful call.
    pub fn map<U, F>(self, f: F) -> CallOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            CallOutcome::Success(value) => CallOutcome::Success(f(value)),
            CallOutcome::Failure(failure) => CallOutcome::Failure(failure),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            CallOutcome::Success(value) => Ok(value),
            CallOutcome::Failure(failure) => Err(failure),
        }
    }
}

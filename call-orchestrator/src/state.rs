//! Call state machine shared by all call shapes.
//!
//! ```text
//! Idle -> Sending -> [SendingReceiving] -> Draining -> Succeeded
//!   \________\______________\_________________\-----> Failed
//! ```

use std::fmt;
use std::sync::Mutex;

/// Where a call is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    /// Nothing has been sent yet.
    Idle,
    /// Requests are being written.
    Sending,
    /// Requests are being written while responses are read.
    SendingReceiving,
    /// All requests are written; waiting for the remaining responses.
    Draining,
    /// The call completed.
    Succeeded,
    /// The call failed.
    Failed,
}

impl CallState {
    /// Returns `true` for `Succeeded` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Succeeded | CallState::Failed)
    }

    /// Returns `true` if a call may move from `self` to `next`.
    pub fn can_transition_to(self, next: CallState) -> bool {
        use CallState::*;

        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Idle, Sending)
            | (Sending, SendingReceiving)
            | (Sending, Draining)
            | (SendingReceiving, Draining)
            | (Draining, Succeeded) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallState::Idle => "idle",
            CallState::Sending => "sending",
            CallState::SendingReceiving => "sending+receiving",
            CallState::Draining => "draining",
            CallState::Succeeded => "succeeded",
            CallState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the state of one call.
///
/// Shared by reference between the write and read halves of a
/// bidirectional call, hence the lock. The lock is never held across an
/// await point.
#[derive(Debug)]
pub(crate) struct CallProgress {
    method: &'static str,
    state: Mutex<CallState>,
}

impl CallProgress {
    pub(crate) fn new(method: &'static str) -> Self {
        Self {
            method,
            state: Mutex::new(CallState::Idle),
        }
    }

    pub(crate) fn method(&self) -> &'static str {
        self.method
    }

    pub(crate) fn current(&self) -> CallState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move to `next`, returning the state the call was in.
    ///
    /// Illegal transitions leave the state untouched.
    pub(crate) fn advance(&self, next: CallState) -> CallState {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let previous = *state;

        if previous.can_transition_to(next) {
            tracing::trace!(method = self.method, from = %previous, to = %next, "call state");
            *state = next;
        } else {
            tracing::debug!(
                method = self.method,
                from = %previous,
                to = %next,
                "ignoring illegal call state transition"
            );
        }

        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CallState::*;

    #[test]
    fn streaming_paths_are_legal() {
        for path in [
            &[Idle, Sending, Draining, Succeeded][..],
            &[Idle, Sending, SendingReceiving, Draining, Succeeded][..],
        ] {
            for pair in path.windows(2) {
                assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn any_live_state_can_fail() {
        for state in [Idle, Sending, SendingReceiving, Draining] {
            assert!(state.can_transition_to(Failed));
        }
        assert!(!Succeeded.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn no_skipping_or_going_back() {
        assert!(!Idle.can_transition_to(Draining));
        assert!(!Idle.can_transition_to(Succeeded));
        assert!(!Draining.can_transition_to(Sending));
        assert!(!Succeeded.can_transition_to(Idle));
    }

    #[test]
    fn progress_ignores_illegal_moves() {
        let progress = CallProgress::new("Test");
        assert_eq!(progress.advance(Sending), Idle);
        assert_eq!(progress.advance(Succeeded), Sending);
        assert_eq!(progress.current(), Sending);
        progress.advance(Failed);
        assert_eq!(progress.current(), Failed);
        progress.advance(Draining);
        assert_eq!(progress.current(), Failed);
    }
}

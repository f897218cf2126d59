//! Configuration for orchestrated calls.

use std::time::Duration;

use crate::error::{Error, Result};

/// How streamed responses are handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Hand over every item as soon as it arrives.
    ///
    /// The item callback is invoked once per item with a one-element batch.
    #[default]
    AsArrived,

    /// Buffer every item and hand them over once the stream has ended.
    ///
    /// The item callback is invoked exactly once with the full batch, which
    /// may be empty. Buffered items are dropped if the call fails.
    OnCompletion,
}

/// Deadlines and buffering for orchestrated calls.
///
/// The deadlines are the defaults used by callers that do not pick their
/// own; every orchestrator operation still takes an explicit deadline.
///
/// # Example
///
/// ```
/// use call_orchestrator::{CallConfig, DeliveryPolicy};
/// use std::time::Duration;
///
/// let config = CallConfig::default()
///     .with_unary_deadline(Duration::from_secs(2)).unwrap()
///     .with_delivery(DeliveryPolicy::OnCompletion);
///
/// assert_eq!(config.unary_deadline, Duration::from_secs(2));
/// assert_eq!(config.bidirectional_deadline, Duration::from_secs(6));
/// ```
#[derive(Debug, Clone)]
pub struct CallConfig {
    /// Deadline of unary calls.
    ///
    /// Default: 5 seconds.
    pub unary_deadline: Duration,

    /// Deadline of server-streaming calls.
    ///
    /// Default: 5 seconds.
    pub server_streaming_deadline: Duration,

    /// Deadline of client-streaming calls.
    ///
    /// Default: 5 seconds.
    pub client_streaming_deadline: Duration,

    /// Deadline of bidirectional-streaming calls.
    ///
    /// Default: 6 seconds.
    pub bidirectional_deadline: Duration,

    /// Delivery policy used when the caller does not pick one.
    ///
    /// Default: [`DeliveryPolicy::AsArrived`].
    pub delivery: DeliveryPolicy,

    /// Number of outbound messages a transport may buffer per call before
    /// writes start waiting.
    ///
    /// Default: 16.
    pub outbound_buffer: usize,
}

impl CallConfig {
    /// Set the deadline of unary calls.
    ///
    /// # Errors
    ///
    /// Returns an error if `deadline` is zero.
    pub fn with_unary_deadline(mut self, deadline: Duration) -> Result<Self> {
        self.unary_deadline = non_zero("unary_deadline", deadline)?;
        Ok(self)
    }

    /// Set the deadline of server-streaming calls.
    ///
    /// # Errors
    ///
    /// Returns an error if `deadline` is zero.
    pub fn with_server_streaming_deadline(mut self, deadline: Duration) -> Result<Self> {
        self.server_streaming_deadline = non_zero("server_streaming_deadline", deadline)?;
        Ok(self)
    }

    /// Set the deadline of client-streaming calls.
    ///
    /// # Errors
    ///
    /// Returns an error if `deadline` is zero.
    pub fn with_client_streaming_deadline(mut self, deadline: Duration) -> Result<Self> {
        self.client_streaming_deadline = non_zero("client_streaming_deadline", deadline)?;
        Ok(self)
    }

    /// Set the deadline of bidirectional-streaming calls.
    ///
    /// # Errors
    ///
    /// Returns an error if `deadline` is zero.
    pub fn with_bidirectional_deadline(mut self, deadline: Duration) -> Result<Self> {
        self.bidirectional_deadline = non_zero("bidirectional_deadline", deadline)?;
        Ok(self)
    }

    /// Set the same deadline for unary, server-streaming and client-streaming
    /// calls, leaving the bidirectional deadline untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `deadline` is zero.
    pub fn with_deadline(self, deadline: Duration) -> Result<Self> {
        self.with_unary_deadline(deadline)?
            .with_server_streaming_deadline(deadline)?
            .with_client_streaming_deadline(deadline)
    }

    /// Set the default delivery policy.
    pub fn with_delivery(mut self, delivery: DeliveryPolicy) -> Self {
        self.delivery = delivery;
        self
    }

    /// Set how many requests a streaming call may buffer ahead of the
    /// transport. Passed to the transport with every call.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn with_outbound_buffer(mut self, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidInput("outbound_buffer must be greater than zero".into()));
        }
        self.outbound_buffer = size;
        Ok(self)
    }
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            unary_deadline: Duration::from_secs(5),
            server_streaming_deadline: Duration::from_secs(5),
            client_streaming_deadline: Duration::from_secs(5),
            bidirectional_deadline: Duration::from_secs(6),
            delivery: DeliveryPolicy::AsArrived,
            outbound_buffer: 16,
        }
    }
}

fn non_zero(name: &str, deadline: Duration) -> Result<Duration> {
    if deadline.is_zero() {
        return Err(Error::InvalidInput(format!("{name} must be greater than zero")));
    }
    Ok(deadline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deadlines() {
        let config = CallConfig::default();
        assert_eq!(config.unary_deadline, Duration::from_secs(5));
        assert_eq!(config.server_streaming_deadline, Duration::from_secs(5));
        assert_eq!(config.client_streaming_deadline, Duration::from_secs(5));
        assert_eq!(config.bidirectional_deadline, Duration::from_secs(6));
        assert_eq!(config.delivery, DeliveryPolicy::AsArrived);
        assert_eq!(config.outbound_buffer, 16);
    }

    #[test]
    fn zero_deadlines_are_rejected() {
        let err = CallConfig::default()
            .with_bidirectional_deadline(Duration::ZERO)
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidInput("bidirectional_deadline must be greater than zero".into())
        );
        assert!(CallConfig::default()
            .with_deadline(Duration::ZERO)
            .is_err());
        assert!(CallConfig::default().with_outbound_buffer(0).is_err());
    }

    #[test]
    fn with_deadline_leaves_bidirectional_alone() {
        let config = CallConfig::default()
            .with_deadline(Duration::from_millis(750))
            .unwrap();
        assert_eq!(config.unary_deadline, Duration::from_millis(750));
        assert_eq!(config.server_streaming_deadline, Duration::from_millis(750));
        assert_eq!(config.client_streaming_deadline, Duration::from_millis(750));
        assert_eq!(config.bidirectional_deadline, Duration::from_secs(6));
    }
}

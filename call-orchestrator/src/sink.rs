//! Destinations for textual call results.
//!
//! A sink is handed to whoever produces results, so there is no global
//! dispatcher: the sink itself decides whether a delivery has to hop onto
//! another execution context.

use tokio::sync::mpsc;

/// Receives textual results of calls.
pub trait ResultSink: Send + Sync {
    /// Deliver `text`.
    ///
    /// `may_cross_thread` is `true` when the caller may be running outside
    /// the context that owns presentation, in which case the sink must
    /// marshal the delivery onto that context. When `false` inline delivery
    /// is acceptable.
    fn deliver(&self, text: String, may_cross_thread: bool);
}

impl<F> ResultSink for F
where
    F: Fn(String, bool) + Send + Sync,
{
    fn deliver(&self, text: String, may_cross_thread: bool) {
        self(text, may_cross_thread)
    }
}

/// One delivery queued for the presentation context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The delivered text.
    pub text: String,
    /// Whether the producer asked for marshaling.
    pub cross_thread: bool,
}

/// A sink that queues deliveries for a presentation task.
///
/// Every delivery is sent over an unbounded channel, so producers on any
/// task or thread never wait on rendering. The receiving half belongs to
/// whatever owns presentation and renders deliveries in order.
///
/// # Example
///
/// ```
/// use call_orchestrator::{PresentationSink, ResultSink};
///
/// let (sink, mut deliveries) = PresentationSink::new();
/// sink.deliver("Berkshire Valley Management Area Trail".to_string(), false);
///
/// let delivery = deliveries.try_recv().unwrap();
/// assert_eq!(delivery.text, "Berkshire Valley Management Area Trail");
/// ```
#[derive(Debug, Clone)]
pub struct PresentationSink {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl PresentationSink {
    /// Create a sink and the receiver owned by the presentation context.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ResultSink for PresentationSink {
    fn deliver(&self, text: String, may_cross_thread: bool) {
        let delivery = Delivery {
            text,
            cross_thread: may_cross_thread,
        };

        if self.tx.send(delivery).is_err() {
            tracing::debug!("presentation context is gone, dropping delivery");
        }
    }
}

/// A sink that writes every delivery to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    fn deliver(&self, text: String, may_cross_thread: bool) {
        tracing::info!(cross_thread = may_cross_thread, "{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            move |text: String, cross: bool| seen.lock().unwrap().push((text, cross))
        };

        sink.deliver("first".into(), false);
        sink.deliver("second".into(), true);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first".to_string(), false), ("second".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn presentation_sink_marshals_across_tasks() {
        let (sink, mut deliveries) = PresentationSink::new();

        tokio::spawn(async move {
            sink.deliver("from another task".into(), true);
        })
        .await
        .unwrap();

        assert_eq!(
            deliveries.recv().await,
            Some(Delivery {
                text: "from another task".into(),
                cross_thread: true,
            })
        );
        // All senders are gone once the task finished.
        assert_eq!(deliveries.recv().await, None);
    }

    #[test]
    fn presentation_sink_survives_a_closed_receiver() {
        let (sink, deliveries) = PresentationSink::new();
        drop(deliveries);
        sink.deliver("nobody listens".into(), false);
    }
}

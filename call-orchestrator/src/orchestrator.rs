//! Orchestration of the four call shapes over a shared [`Transport`].

use std::future::Future;
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::{CallConfig, DeliveryPolicy};
use crate::error::{Error, Result};
use crate::method::{Method, WireMessage};
use crate::outcome::{CallOutcome, Failure, StreamStats};
use crate::state::{CallProgress, CallState};
use crate::transport::{CallContext, InboundStream, OutboundStream, Transport};

/// Drives calls over one shared transport.
///
/// Every operation takes `&self`, so a single orchestrator (typically behind
/// an `Arc`) serves any number of concurrent calls. Each operation resolves
/// to exactly one [`CallOutcome`]: transport errors, decode errors, deadline
/// expiry and shutdown never escape as panics or errors.
///
/// Dropping an operation's future cancels every read and write it has in
/// flight.
#[derive(Debug)]
pub struct Orchestrator<T> {
    transport: T,
    config: CallConfig,
    shutdown: CancellationToken,
    in_flight: TaskTracker,
    closed: OnceCell<()>,
}

impl<T: Transport> Orchestrator<T> {
    /// Create an orchestrator owning `transport`.
    pub fn new(transport: T, config: CallConfig) -> Self {
        Self {
            transport,
            config,
            shutdown: CancellationToken::new(),
            in_flight: TaskTracker::new(),
            closed: OnceCell::new(),
        }
    }

    /// The configuration this orchestrator was created with.
    pub fn config(&self) -> &CallConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of calls currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Send one request and wait for one response.
    ///
    /// The call stays in [`CallState::Sending`] until the response arrived,
    /// so a refused connection or a missed deadline is reported there.
    pub async fn unary<M>(
        &self,
        request: M::Request,
        deadline: Duration,
    ) -> CallOutcome<M::Response>
    where
        M: Method,
    {
        let progress = CallProgress::new(M::name());
        let ctx = self.context::<M>(deadline);

        let call = async {
            progress.advance(CallState::Sending);
            let reply = self
                .transport
                .call_unary(ctx, request.encode_bytes())
                .await?;
            progress.advance(CallState::Draining);
            M::Response::decode_bytes(reply)
        };

        self.run(&progress, deadline, call).await
    }

    /// Send one request and read the response stream.
    ///
    /// `on_items` receives the responses according to `delivery`: one
    /// single-item batch per response for [`DeliveryPolicy::AsArrived`], or
    /// one batch holding every response once the stream ended for
    /// [`DeliveryPolicy::OnCompletion`].
    pub async fn server_streaming<M, F>(
        &self,
        request: M::Request,
        deadline: Duration,
        delivery: DeliveryPolicy,
        mut on_items: F,
    ) -> CallOutcome<StreamStats>
    where
        M: Method,
        F: FnMut(Vec<M::Response>) + Send,
    {
        let progress = CallProgress::new(M::name());
        let ctx = self.context::<M>(deadline);

        let call = async {
            progress.advance(CallState::Sending);
            let mut inbound = self
                .transport
                .open_server_stream(ctx, request.encode_bytes())
                .await?;

            progress.advance(CallState::Draining);
            let received = drain_inbound(&mut inbound, delivery, &mut on_items).await?;

            Ok::<_, Error>(StreamStats { sent: 1, received })
        };

        self.run(&progress, deadline, call).await
    }

    /// Write a stream of requests and wait for the single response.
    ///
    /// Requests are written strictly in order and end-of-input is signalled
    /// only after every write completed. A stream without any request is
    /// rejected before anything is sent.
    pub async fn client_streaming<M, S>(
        &self,
        requests: S,
        deadline: Duration,
    ) -> CallOutcome<M::Response>
    where
        M: Method,
        S: Stream<Item = M::Request> + Send,
    {
        let progress = CallProgress::new(M::name());
        let ctx = self.context::<M>(deadline);

        let call = async {
            let mut requests = Box::pin(requests);
            let first = requests.next().await.ok_or_else(|| {
                Error::InvalidInput("client streaming call requires at least one request".into())
            })?;

            progress.advance(CallState::Sending);
            let (outbound, reply) = self.transport.open_client_stream(ctx).await?;

            let write = async {
                let requests = tokio_stream::once(first).chain(requests);
                let sent = pump_outbound(outbound, requests).await?;
                progress.advance(CallState::Draining);
                tracing::trace!(method = M::name(), sent, "request stream finished");
                Ok::<_, Error>(sent)
            };

            let (_, response) = tokio::try_join!(write, reply)?;
            M::Response::decode_bytes(response)
        };

        self.run(&progress, deadline, call).await
    }

    /// Write a stream of requests while reading the response stream.
    ///
    /// Writing and reading run concurrently; the call completes once the
    /// request stream was finished and the response stream ended. A failure
    /// on either side aborts both. `on_items` follows `delivery` exactly as
    /// for [`server_streaming`](Self::server_streaming).
    pub async fn bidirectional_streaming<M, S, F>(
        &self,
        requests: S,
        deadline: Duration,
        delivery: DeliveryPolicy,
        mut on_items: F,
    ) -> CallOutcome<StreamStats>
    where
        M: Method,
        S: Stream<Item = M::Request> + Send,
        F: FnMut(Vec<M::Response>) + Send,
    {
        let progress = CallProgress::new(M::name());
        let ctx = self.context::<M>(deadline);

        let call = async {
            progress.advance(CallState::Sending);
            let (outbound, mut inbound) = self.transport.open_duplex_stream(ctx).await?;
            progress.advance(CallState::SendingReceiving);

            let write = async {
                let sent = pump_outbound(outbound, requests).await?;
                progress.advance(CallState::Draining);
                tracing::trace!(method = M::name(), sent, "request stream finished");
                Ok::<_, Error>(sent)
            };
            let read = drain_inbound(&mut inbound, delivery, &mut on_items);

            let (sent, received) = tokio::try_join!(write, read)?;
            Ok::<_, Error>(StreamStats { sent, received })
        };

        self.run(&progress, deadline, call).await
    }

    /// Cancel every in-flight call, wait for them to finish, then close the
    /// transport.
    ///
    /// Calling this more than once, or concurrently, is safe: the transport
    /// is closed exactly once and every caller returns after it was.
    pub async fn shutdown(&self) {
        self.closed
            .get_or_init(|| async {
                tracing::debug!(in_flight = self.in_flight.len(), "shutting down");

                self.shutdown.cancel();
                self.in_flight.close();
                self.in_flight.wait().await;
                self.transport.close().await;

                tracing::debug!("shut down");
            })
            .await;
    }

    fn context<M: Method>(&self, deadline: Duration) -> CallContext {
        CallContext {
            path: M::PATH,
            deadline,
            outbound_buffer: self.config.outbound_buffer,
        }
    }

    async fn run<R, Fut>(
        &self,
        progress: &CallProgress,
        deadline: Duration,
        call: Fut,
    ) -> CallOutcome<R>
    where
        Fut: Future<Output = Result<R>>,
    {
        if self.shutdown.is_cancelled() {
            let error = Error::Cancelled("channel is shut down".into());
            let state = progress.advance(CallState::Failed);
            return CallOutcome::Failure(Failure::from_error(&error, state));
        }

        let guarded = async {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    Err(Error::Cancelled("channel shut down while the call was in flight".into()))
                }
                result = tokio::time::timeout(deadline, call) => {
                    result.unwrap_or(Err(Error::DeadlineExceeded(deadline)))
                }
            }
        };

        match self.in_flight.track_future(guarded).await {
            Ok(value) => {
                progress.advance(CallState::Succeeded);
                tracing::debug!(
                    method = progress.method(),
                    state = %progress.current(),
                    "call completed"
                );
                CallOutcome::Success(value)
            }
            Err(error) => {
                let state = progress.advance(CallState::Failed);
                tracing::warn!(
                    method = progress.method(),
                    %state,
                    transient = error.is_transient(),
                    "call failed: {error}"
                );
                CallOutcome::Failure(Failure::from_error(&error, state))
            }
        }
    }
}

/// Write every request, then signal end-of-input.
async fn pump_outbound<O, S>(mut outbound: O, requests: S) -> Result<usize>
where
    O: OutboundStream,
    S: Stream,
    S::Item: WireMessage,
{
    let mut requests = std::pin::pin!(requests);
    let mut sent = 0;

    while let Some(request) = requests.next().await {
        outbound.send(request.encode_bytes()).await?;
        sent += 1;
    }

    outbound.finish().await?;
    Ok(sent)
}

/// Read responses until the stream ends, handing them over per `delivery`.
async fn drain_inbound<R, I, F>(
    inbound: &mut I,
    delivery: DeliveryPolicy,
    on_items: &mut F,
) -> Result<usize>
where
    R: WireMessage,
    I: InboundStream,
    F: FnMut(Vec<R>),
{
    let mut buffered = Vec::new();
    let mut received = 0;

    while let Some(bytes) = inbound.recv().await? {
        let item = R::decode_bytes(bytes)?;
        received += 1;

        match delivery {
            DeliveryPolicy::AsArrived => on_items(vec![item]),
            DeliveryPolicy::OnCompletion => buffered.push(item),
        }
    }

    if delivery == DeliveryPolicy::OnCompletion {
        on_items(buffered);
    }

    Ok(received)
}

#[cfg(all(test, feature = "codegen-prost"))]
mod tests {
    use super::*;
    use crate::testutil::{Behavior, Event, MockTransport};
    use bytes::Bytes;

    #[derive(Clone, PartialEq, prost::Message)]
    struct Tick {
        #[prost(uint32, tag = "1")]
        n: u32,
    }

    const CTX: CallContext = CallContext {
        path: "/test.Ticker/Tick",
        deadline: Duration::from_secs(1),
        outbound_buffer: 16,
    };

    #[tokio::test]
    async fn pump_finishes_after_the_last_write() {
        let transport = MockTransport::new(Behavior::Silent);
        let (outbound, _reply) = transport.open_client_stream(CTX).await.unwrap();

        let sent = pump_outbound(outbound, tokio_stream::iter([Tick { n: 1 }, Tick { n: 2 }]))
            .await
            .unwrap();

        assert_eq!(sent, 2);
        assert_eq!(transport.journal().last(), Some(&Event::Finish));
    }

    #[tokio::test]
    async fn drain_batches_per_policy() {
        let items = vec![Tick { n: 1 }.encode_bytes(), Tick { n: 2 }.encode_bytes()];
        let transport = MockTransport::new(Behavior::Respond {
            items,
            delay: Duration::ZERO,
        });

        for (delivery, expected) in [
            (DeliveryPolicy::AsArrived, vec![vec![1], vec![2]]),
            (DeliveryPolicy::OnCompletion, vec![vec![1, 2]]),
        ] {
            let mut inbound = transport
                .open_server_stream(CTX, Bytes::new())
                .await
                .unwrap();
            let mut batches = Vec::new();
            let mut on_items =
                |items: Vec<Tick>| batches.push(items.iter().map(|t| t.n).collect::<Vec<_>>());

            let received = drain_inbound(&mut inbound, delivery, &mut on_items)
                .await
                .unwrap();

            assert_eq!(received, 2);
            assert_eq!(batches, expected);
        }
    }
}

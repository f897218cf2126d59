//! A scripted in-memory [`Transport`] for exercising the orchestrator.
//!
//! [`MockTransport`] answers every call shape according to a [`Behavior`]
//! and records what crossed the wire in a journal, so tests can assert on
//! write order, end-of-input and shutdown without a network.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::transport::{BoxFuture, CallContext, InboundStream, OutboundStream, Transport};

/// Computes a single reply from every request written on a call.
pub type Aggregator = Arc<dyn Fn(&[Bytes]) -> Bytes + Send + Sync>;

/// How a [`MockTransport`] answers calls.
#[derive(Clone)]
pub enum Behavior {
    /// Answer every request with itself, after `delay`.
    ///
    /// Client streams answer with the last request written. Duplex calls
    /// hold at most one unanswered request: each write waits until the
    /// reply to the previous one has been read.
    Echo {
        /// Delay before each response.
        delay: Duration,
    },
    /// Answer with the scripted `items`, each after `delay`.
    ///
    /// Unary and client-streaming calls answer with the first item.
    Respond {
        /// Responses, in order.
        items: Vec<Bytes>,
        /// Delay before each response.
        delay: Duration,
    },
    /// Answer once the request stream finished, with one aggregated reply.
    Aggregate(Aggregator),
    /// Accept calls but never answer.
    Silent,
    /// Refuse to open any call.
    Refuse(String),
    /// Fail the write with the given zero-based index.
    ///
    /// Unary and server-streaming calls echo and client streams answer with
    /// the last request written. Duplex calls never answer, so their
    /// response stream stays open after the failed write.
    FailWriteAt(usize),
    /// Stream the scripted items, then reset the response stream.
    ///
    /// Unary and client-streaming calls fail without answering.
    FailAfter(Vec<Bytes>),
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Echo { delay } => f.debug_struct("Echo").field("delay", delay).finish(),
            Behavior::Respond { items, delay } => f
                .debug_struct("Respond")
                .field("items", &items.len())
                .field("delay", delay)
                .finish(),
            Behavior::Aggregate(_) => f.write_str("Aggregate"),
            Behavior::Silent => f.write_str("Silent"),
            Behavior::Refuse(reason) => f.debug_tuple("Refuse").field(reason).finish(),
            Behavior::FailWriteAt(index) => f.debug_tuple("FailWriteAt").field(index).finish(),
            Behavior::FailAfter(items) => f.debug_tuple("FailAfter").field(&items.len()).finish(),
        }
    }
}

/// Something that crossed a [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A call was opened on the given path.
    Open(&'static str),
    /// A request was written.
    Write(Bytes),
    /// End-of-input was signalled.
    Finish,
    /// A response was handed to the caller.
    Read(Bytes),
    /// The transport was closed.
    Close,
}

#[derive(Debug)]
struct Inner {
    behavior: Behavior,
    journal: Mutex<Vec<Event>>,
    contexts: Mutex<Vec<CallContext>>,
    closes: AtomicUsize,
}

impl Inner {
    fn record(&self, event: Event) {
        self.journal
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

fn reset() -> Error {
    Error::Connection("stream reset by peer".into())
}

fn dropped() -> Error {
    Error::Cancelled("request stream dropped before it finished".into())
}

/// An in-memory transport driven by a [`Behavior`].
///
/// Clones share the same journal.
#[derive(Debug, Clone)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    /// Create a transport answering calls per `behavior`.
    pub fn new(behavior: Behavior) -> Self {
        Self {
            inner: Arc::new(Inner {
                behavior,
                journal: Mutex::new(Vec::new()),
                contexts: Mutex::new(Vec::new()),
                closes: AtomicUsize::new(0),
            }),
        }
    }

    /// Everything recorded so far, in order.
    pub fn journal(&self) -> Vec<Event> {
        self.inner
            .journal
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The requests written so far, in order.
    pub fn writes(&self) -> Vec<Bytes> {
        self.journal()
            .into_iter()
            .filter_map(|event| match event {
                Event::Write(bytes) => Some(bytes),
                _ => None,
            })
            .collect()
    }

    /// Number of calls opened so far.
    pub fn opened(&self) -> usize {
        self.journal()
            .iter()
            .filter(|event| matches!(event, Event::Open(_)))
            .count()
    }

    /// The context of every call opened so far, in order.
    pub fn contexts(&self) -> Vec<CallContext> {
        self.inner
            .contexts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of times [`Transport::close`] was called.
    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    fn open(&self, ctx: CallContext) -> Result<()> {
        if let Behavior::Refuse(reason) = &self.inner.behavior {
            return Err(Error::Connection(reason.clone()));
        }
        self.inner
            .contexts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ctx);
        self.inner.record(Event::Open(ctx.path));
        Ok(())
    }

    fn outbound(
        &self,
        echo: Option<mpsc::Sender<Bytes>>,
    ) -> (MockOutbound, oneshot::Receiver<Vec<Bytes>>) {
        let (done_tx, done_rx) = oneshot::channel();
        let fail_at = match self.inner.behavior {
            Behavior::FailWriteAt(index) => Some(index),
            _ => None,
        };

        let outbound = MockOutbound {
            inner: self.inner.clone(),
            written: Vec::new(),
            fail_at,
            echo,
            done: Some(done_tx),
        };
        (outbound, done_rx)
    }

    fn inbound(&self, source: Source) -> MockInbound {
        let delay = match &self.inner.behavior {
            Behavior::Echo { delay } | Behavior::Respond { delay, .. } => *delay,
            _ => Duration::ZERO,
        };

        MockInbound {
            inner: self.inner.clone(),
            source,
            delay,
        }
    }
}

impl Transport for MockTransport {
    type Outbound = MockOutbound;
    type Inbound = MockInbound;

    async fn call_unary(&self, ctx: CallContext, request: Bytes) -> Result<Bytes> {
        self.open(ctx)?;
        self.inner.record(Event::Write(request.clone()));

        let reply = match &self.inner.behavior {
            Behavior::Echo { delay } => {
                tokio::time::sleep(*delay).await;
                request
            }
            Behavior::Respond { items, delay } => {
                tokio::time::sleep(*delay).await;
                items.first().cloned().ok_or_else(|| Error::Remote {
                    code: "NotFound".into(),
                    message: "no scripted response".into(),
                    transient: false,
                })?
            }
            Behavior::Aggregate(aggregate) => aggregate(&[request]),
            Behavior::Silent => std::future::pending().await,
            Behavior::FailWriteAt(0) => return Err(Error::Connection("write failed".into())),
            Behavior::FailWriteAt(_) => request,
            Behavior::FailAfter(_) => return Err(reset()),
            Behavior::Refuse(reason) => return Err(Error::Connection(reason.clone())),
        };

        self.inner.record(Event::Read(reply.clone()));
        Ok(reply)
    }

    async fn open_server_stream(&self, ctx: CallContext, request: Bytes) -> Result<MockInbound> {
        self.open(ctx)?;
        self.inner.record(Event::Write(request.clone()));

        let source = match &self.inner.behavior {
            Behavior::Echo { .. } | Behavior::FailWriteAt(_) => {
                Source::Queue(VecDeque::from([request]))
            }
            Behavior::Respond { items, .. } => Source::Queue(items.iter().cloned().collect()),
            Behavior::Aggregate(aggregate) => {
                Source::Queue(VecDeque::from([aggregate(&[request])]))
            }
            Behavior::FailAfter(items) => Source::Reset(items.iter().cloned().collect()),
            Behavior::Silent | Behavior::Refuse(_) => Source::Never,
        };

        Ok(self.inbound(source))
    }

    async fn open_client_stream(
        &self,
        ctx: CallContext,
    ) -> Result<(MockOutbound, BoxFuture<Result<Bytes>>)> {
        self.open(ctx)?;

        let (outbound, done) = self.outbound(None);
        let behavior = self.inner.behavior.clone();
        let inner = self.inner.clone();

        let reply = Box::pin(async move {
            let written = done.await.map_err(|_| dropped())?;

            let reply = match behavior {
                Behavior::Echo { delay } => {
                    tokio::time::sleep(delay).await;
                    written.last().cloned().unwrap_or_default()
                }
                Behavior::Respond { items, delay } => {
                    tokio::time::sleep(delay).await;
                    items.first().cloned().unwrap_or_default()
                }
                Behavior::Aggregate(aggregate) => aggregate(&written),
                Behavior::FailWriteAt(_) => written.last().cloned().unwrap_or_default(),
                Behavior::FailAfter(_) => return Err(reset()),
                Behavior::Silent | Behavior::Refuse(_) => std::future::pending().await,
            };

            inner.record(Event::Read(reply.clone()));
            Ok(reply)
        });

        Ok((outbound, reply))
    }

    async fn open_duplex_stream(&self, ctx: CallContext) -> Result<(MockOutbound, MockInbound)> {
        self.open(ctx)?;

        let (outbound, inbound) = match &self.inner.behavior {
            Behavior::Echo { .. } => {
                let (tx, rx) = mpsc::channel(1);
                let (outbound, _) = self.outbound(Some(tx));
                (outbound, self.inbound(Source::Channel(rx)))
            }
            Behavior::Respond { items, .. } => {
                let (outbound, _) = self.outbound(None);
                (outbound, self.inbound(Source::Queue(items.iter().cloned().collect())))
            }
            Behavior::Aggregate(aggregate) => {
                let (outbound, done) = self.outbound(None);
                (outbound, self.inbound(Source::Deferred(done, aggregate.clone())))
            }
            Behavior::FailAfter(items) => {
                let (outbound, _) = self.outbound(None);
                (outbound, self.inbound(Source::Reset(items.iter().cloned().collect())))
            }
            Behavior::FailWriteAt(_) | Behavior::Silent | Behavior::Refuse(_) => {
                let (outbound, _) = self.outbound(None);
                (outbound, self.inbound(Source::Never))
            }
        };

        Ok((outbound, inbound))
    }

    async fn close(&self) {
        self.inner.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.record(Event::Close);
    }
}

/// Request half of a [`MockTransport`] call.
#[derive(Debug)]
pub struct MockOutbound {
    inner: Arc<Inner>,
    written: Vec<Bytes>,
    fail_at: Option<usize>,
    echo: Option<mpsc::Sender<Bytes>>,
    done: Option<oneshot::Sender<Vec<Bytes>>>,
}

impl OutboundStream for MockOutbound {
    async fn send(&mut self, message: Bytes) -> Result<()> {
        if self.fail_at == Some(self.written.len()) {
            return Err(Error::Connection("write failed".into()));
        }

        self.inner.record(Event::Write(message.clone()));
        if let Some(echo) = &self.echo {
            // Waits for the previous reply to be read.
            let _ = echo.send(message.clone()).await;
        }
        self.written.push(message);
        Ok(())
    }

    async fn finish(mut self) -> Result<()> {
        self.inner.record(Event::Finish);
        self.echo.take();
        if let Some(done) = self.done.take() {
            let _ = done.send(std::mem::take(&mut self.written));
        }
        Ok(())
    }
}

enum Source {
    Queue(VecDeque<Bytes>),
    Reset(VecDeque<Bytes>),
    Channel(mpsc::Receiver<Bytes>),
    Deferred(oneshot::Receiver<Vec<Bytes>>, Aggregator),
    Never,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Queue(queue) => return f.debug_tuple("Queue").field(&queue.len()).finish(),
            Source::Reset(queue) => return f.debug_tuple("Reset").field(&queue.len()).finish(),
            Source::Channel(_) => "Channel",
            Source::Deferred(..) => "Deferred",
            Source::Never => "Never",
        };
        f.write_str(name)
    }
}

/// Response half of a [`MockTransport`] call.
#[derive(Debug)]
pub struct MockInbound {
    inner: Arc<Inner>,
    source: Source,
    delay: Duration,
}

impl InboundStream for MockInbound {
    async fn recv(&mut self) -> Result<Option<Bytes>> {
        let next = match &mut self.source {
            Source::Queue(queue) => {
                if queue.is_empty() {
                    return Ok(None);
                }
                tokio::time::sleep(self.delay).await;
                queue.pop_front()
            }
            Source::Reset(queue) => Some(queue.pop_front().ok_or_else(reset)?),
            Source::Channel(rx) => {
                let next = rx.recv().await;
                if next.is_some() {
                    tokio::time::sleep(self.delay).await;
                }
                next
            }
            Source::Deferred(done, aggregate) => {
                let written = done.await.map_err(|_| dropped())?;
                let reply = aggregate(&written);
                self.source = Source::Queue(VecDeque::new());
                Some(reply)
            }
            Source::Never => std::future::pending().await,
        };

        if let Some(bytes) = &next {
            self.inner.record(Event::Read(bytes.clone()));
        }
        Ok(next)
    }
}

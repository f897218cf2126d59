//! Provides abstraction for transport layers.

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

#[cfg(feature = "transport-tonic")]
pub mod tonic;

/// A boxed, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Per-call information handed to every transport primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Full method path, `/<package>.<Service>/<Method>`.
    pub path: &'static str,
    /// Deadline of the call, for transports that propagate it to the server.
    pub deadline: Duration,
    /// How many outbound messages a streaming call may buffer before a
    /// write waits for the transport.
    pub outbound_buffer: usize,
}

/// An open connection to one server endpoint.
///
/// This abstraction allows for different transport implementations:
/// - Tonic-based gRPC transport
/// - Mock transport for testing
/// - Other RPC frameworks
///
/// Messages cross this boundary already serialized; the orchestrator owns
/// encoding, decoding, deadlines and cancellation. Dropping any future or
/// stream returned by a transport must cancel the underlying operation.
pub trait Transport: Send + Sync + 'static {
    /// The outbound half of a client or bidirectional stream.
    type Outbound: OutboundStream;

    /// The inbound half of a server or bidirectional stream.
    type Inbound: InboundStream;

    /// Send one request and wait for one response.
    fn call_unary(
        &self,
        ctx: CallContext,
        request: Bytes,
    ) -> impl Future<Output = Result<Bytes>> + Send;

    /// Send one request and open the response stream.
    fn open_server_stream(
        &self,
        ctx: CallContext,
        request: Bytes,
    ) -> impl Future<Output = Result<Self::Inbound>> + Send;

    /// Open a request stream.
    ///
    /// Returns the outbound half and a future resolving to the single
    /// response. The response future must be polled while requests are
    /// written; it resolves once the server has answered, which normally
    /// happens after [`OutboundStream::finish`].
    fn open_client_stream(
        &self,
        ctx: CallContext,
    ) -> impl Future<Output = Result<(Self::Outbound, BoxFuture<Result<Bytes>>)>> + Send;

    /// Open a request stream and a response stream on the same call.
    fn open_duplex_stream(
        &self,
        ctx: CallContext,
    ) -> impl Future<Output = Result<(Self::Outbound, Self::Inbound)>> + Send;

    /// Release the connection.
    ///
    /// Called once, after every in-flight call has finished.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// The request half of a streaming call.
pub trait OutboundStream: Send + 'static {
    /// Write one serialized request.
    fn send(&mut self, message: Bytes) -> impl Future<Output = Result<()>> + Send;

    /// Signal end-of-input.
    fn finish(self) -> impl Future<Output = Result<()>> + Send;
}

/// The response half of a streaming call.
pub trait InboundStream: Send + 'static {
    /// Receive the next serialized response.
    ///
    /// Returns:
    /// - `Ok(Some(bytes))` - Received a response.
    /// - `Ok(None)` - Stream ended normally.
    /// - `Err(_)` - Stream error (connection dropped, error status, etc.)
    fn recv(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;
}

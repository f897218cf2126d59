//! `tonic` based transport implementation.
//!
//! This transport uses tonic's low-level `Grpc` client with a `BytesCodec`
//! to send and receive raw bytes, allowing the orchestrator to handle
//! serialization/deserialization independently.

use crate::error::{Error, Result};
use crate::transport::{BoxFuture, CallContext, InboundStream, OutboundStream, Transport};
use bytes::{Buf, BufMut, Bytes};
use http::uri::PathAndQuery;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::client::Grpc;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::{Code, Status, Streaming};

/// A codec that passes bytes through without serialization.
///
/// This allows us to handle serialization in the orchestrator
/// rather than in the transport layer.
#[derive(Debug, Clone, Copy)]
struct BytesCodec;

impl Codec for BytesCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = BytesEncoder;
    type Decoder = BytesDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        BytesEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        BytesDecoder
    }
}

#[derive(Debug)]
struct BytesEncoder;

impl Encoder for BytesEncoder {
    type Item = Bytes;
    type Error = Status;

    fn encode(
        &mut self,
        item: Self::Item,
        dst: &mut EncodeBuf<'_>,
    ) -> std::result::Result<(), Self::Error> {
        dst.put_slice(&item);
        Ok(())
    }
}

#[derive(Debug)]
struct BytesDecoder;

impl Decoder for BytesDecoder {
    type Item = Bytes;
    type Error = Status;

    fn decode(
        &mut self,
        src: &mut DecodeBuf<'_>,
    ) -> std::result::Result<Option<Self::Item>, Self::Error> {
        Ok(Some(src.copy_to_bytes(src.remaining())))
    }
}

/// TLS settings of a channel.
///
/// Server certificates are verified against the platform's native roots,
/// plus the optional extra CA certificate.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// PEM encoded CA certificate to trust in addition to the native roots.
    pub ca_certificate: Option<Vec<u8>>,

    /// Name to verify the server certificate against, instead of the host.
    pub domain_name: Option<String>,
}

impl TlsConfig {
    /// Create TLS settings that trust the native roots only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust an extra PEM encoded CA certificate.
    pub fn with_ca_certificate(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.ca_certificate = Some(pem.into());
        self
    }

    /// Verify the server certificate against `domain_name`.
    pub fn with_domain_name(mut self, domain_name: impl Into<String>) -> Self {
        self.domain_name = Some(domain_name.into());
        self
    }

    fn client_config(&self) -> ClientTlsConfig {
        let mut config = ClientTlsConfig::new().with_native_roots();
        if let Some(pem) = &self.ca_certificate {
            config = config.ca_certificate(Certificate::from_pem(pem));
        }
        if let Some(domain_name) = &self.domain_name {
            config = config.domain_name(domain_name.clone());
        }
        config
    }
}

/// Where and how to connect.
///
/// Channels are encrypted unless plaintext is explicitly requested.
///
/// # Example
///
/// ```
/// use call_orchestrator::ChannelConfig;
///
/// let config = ChannelConfig::new("127.0.0.1", "10000");
/// assert_eq!(config.uri(), "https://127.0.0.1:10000");
///
/// let config = config.plaintext();
/// assert_eq!(config.uri(), "http://127.0.0.1:10000");
/// assert_eq!(config.address(), "127.0.0.1:10000");
/// ```
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Server host name or address.
    pub host: String,

    /// Server port.
    pub port: String,

    /// TLS settings, `None` for a plaintext channel.
    ///
    /// Default: TLS with native roots.
    pub tls: Option<TlsConfig>,

    /// Maximum time to wait for the connection to be established.
    ///
    /// Default: 5 seconds.
    pub connect_timeout: Duration,
}

impl ChannelConfig {
    /// Create a configuration for `host:port` using TLS.
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            tls: Some(TlsConfig::default()),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Use an unencrypted channel.
    pub fn plaintext(mut self) -> Self {
        self.tls = None;
        self
    }

    /// Use TLS with the given settings.
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// The `host:port` address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The URI the channel connects to.
    pub fn uri(&self) -> String {
        let scheme = if self.tls.is_some() { "https" } else { "http" };
        format!("{scheme}://{}", self.address())
    }

    fn endpoint(&self) -> Result<Endpoint> {
        if self.port.parse::<u16>().is_err() {
            return Err(Error::InvalidInput(format!("invalid port {:?}", self.port)));
        }

        let mut endpoint = Endpoint::from_shared(self.uri())
            .map_err(|e| Error::InvalidInput(format!("invalid address {}: {e}", self.address())))?
            .connect_timeout(self.connect_timeout);

        if let Some(tls) = &self.tls {
            endpoint = endpoint
                .tls_config(tls.client_config())
                .map_err(|e| Error::InvalidInput(format!("invalid tls configuration: {e}")))?;
        }

        Ok(endpoint)
    }
}

/// Transport over a shared tonic [`Channel`].
///
/// The channel multiplexes every call made through this transport.
pub struct TonicTransport {
    channel: Mutex<Option<Channel>>,
}

impl TonicTransport {
    /// Create a transport from an existing tonic [`Channel`].
    ///
    /// Use this when you need channel configuration beyond [`ChannelConfig`].
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            channel: Mutex::new(Some(channel)),
        }
    }

    /// Connect to the server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unusable configuration and
    /// [`Error::Connection`] if the server cannot be reached.
    pub async fn connect(config: &ChannelConfig) -> Result<Self> {
        tracing::debug!(uri = %config.uri(), "connecting");

        let channel = config
            .endpoint()?
            .connect()
            .await
            .map_err(|e| {
                Error::Connection(format!("failed to connect to {}: {e}", config.address()))
            })?;

        Ok(Self::from_channel(channel))
    }

    /// Create a transport that connects on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unusable configuration.
    pub fn connect_lazy(config: &ChannelConfig) -> Result<Self> {
        Ok(Self::from_channel(config.endpoint()?.connect_lazy()))
    }

    fn grpc(&self) -> Result<Grpc<Channel>> {
        let channel = self.channel.lock().unwrap_or_else(PoisonError::into_inner);

        match channel.as_ref() {
            Some(channel) => Ok(Grpc::new(channel.clone())),
            None => Err(Error::Connection("channel is closed".into())),
        }
    }
}

impl fmt::Debug for TonicTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self
            .channel
            .lock()
            .map(|channel| channel.is_some())
            .unwrap_or(false);

        f.debug_struct("TonicTransport")
            .field("open", &open)
            .finish()
    }
}

async fn ready(grpc: &mut Grpc<Channel>) -> Result<()> {
    grpc.ready()
        .await
        .map_err(|e| Error::Connection(format!("service was not ready: {e}")))
}

fn path(ctx: &CallContext) -> Result<PathAndQuery> {
    PathAndQuery::try_from(ctx.path)
        .map_err(|e| Error::InvalidInput(format!("invalid method path {:?}: {e}", ctx.path)))
}

fn outbound(ctx: &CallContext) -> (TonicOutbound, ReceiverStream<Bytes>) {
    let (tx, rx) = mpsc::channel(ctx.outbound_buffer.max(1));
    (TonicOutbound { sender: tx }, ReceiverStream::new(rx))
}

fn request<T>(ctx: CallContext, message: T) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    request.set_timeout(ctx.deadline);
    request
}

/// Map a tonic status onto the orchestrator's error taxonomy.
///
/// Statuses carrying a source error were produced locally by the
/// connection stack rather than sent by the server.
fn status_to_error(status: Status) -> Error {
    let code = status.code();

    if code == Code::Unavailable || std::error::Error::source(&status).is_some() {
        return match std::error::Error::source(&status) {
            Some(source) => Error::Connection(format!("{}: {source}", status.message())),
            None => Error::Connection(status.message().to_string()),
        };
    }

    Error::Remote {
        code: format!("{code:?}"),
        message: status.message().to_string(),
        transient: matches!(
            code,
            Code::DeadlineExceeded | Code::ResourceExhausted | Code::Aborted | Code::Cancelled
        ),
    }
}

impl Transport for TonicTransport {
    type Outbound = TonicOutbound;
    type Inbound = TonicInbound;

    async fn call_unary(&self, ctx: CallContext, message: Bytes) -> Result<Bytes> {
        let path = path(&ctx)?;
        let mut grpc = self.grpc()?;
        ready(&mut grpc).await?;

        let response = grpc
            .unary(request(ctx, message), path, BytesCodec)
            .await
            .map_err(status_to_error)?;

        Ok(response.into_inner())
    }

    async fn open_server_stream(&self, ctx: CallContext, message: Bytes) -> Result<TonicInbound> {
        let path = path(&ctx)?;
        let mut grpc = self.grpc()?;
        ready(&mut grpc).await?;

        let response = grpc
            .server_streaming(request(ctx, message), path, BytesCodec)
            .await
            .map_err(status_to_error)?;

        Ok(TonicInbound::open(response.into_inner()))
    }

    async fn open_client_stream(
        &self,
        ctx: CallContext,
    ) -> Result<(TonicOutbound, BoxFuture<Result<Bytes>>)> {
        let path = path(&ctx)?;
        let mut grpc = self.grpc()?;
        let (outbound, requests) = outbound(&ctx);
        let request = request(ctx, requests);

        // Nothing goes on the wire until the reply is polled.
        let reply: BoxFuture<Result<Bytes>> = Box::pin(async move {
            ready(&mut grpc).await?;

            let response = grpc
                .client_streaming(request, path, BytesCodec)
                .await
                .map_err(status_to_error)?;

            Ok(response.into_inner())
        });

        Ok((outbound, reply))
    }

    async fn open_duplex_stream(&self, ctx: CallContext) -> Result<(TonicOutbound, TonicInbound)> {
        let path = path(&ctx)?;
        let mut grpc = self.grpc()?;
        let (outbound, requests) = outbound(&ctx);
        let request = request(ctx, requests);

        // Response headers may only arrive after the first request message,
        // so the call is started by the first read instead of awaited here.
        let response: BoxFuture<Result<Streaming<Bytes>>> = Box::pin(async move {
            ready(&mut grpc).await?;

            let response = grpc
                .streaming(request, path, BytesCodec)
                .await
                .map_err(status_to_error)?;

            Ok(response.into_inner())
        });

        Ok((outbound, TonicInbound::pending(response)))
    }

    async fn close(&self) {
        let channel = self
            .channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if channel.is_some() {
            tracing::debug!("tonic channel released");
        }
    }
}

/// The request half of a tonic stream.
#[derive(Debug)]
pub struct TonicOutbound {
    sender: mpsc::Sender<Bytes>,
}

impl OutboundStream for TonicOutbound {
    async fn send(&mut self, message: Bytes) -> Result<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| Error::Connection("request stream closed by the server".into()))
    }

    async fn finish(self) -> Result<()> {
        // Dropping the sender ends the request body.
        drop(self.sender);
        Ok(())
    }
}

enum InboundState {
    Pending(BoxFuture<Result<Streaming<Bytes>>>),
    Open(Streaming<Bytes>),
    Failed(Error),
}

/// The response half of a tonic stream.
pub struct TonicInbound {
    state: InboundState,
}

impl TonicInbound {
    fn open(streaming: Streaming<Bytes>) -> Self {
        Self {
            state: InboundState::Open(streaming),
        }
    }

    fn pending(response: BoxFuture<Result<Streaming<Bytes>>>) -> Self {
        Self {
            state: InboundState::Pending(response),
        }
    }
}

impl fmt::Debug for TonicInbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            InboundState::Pending(_) => "pending",
            InboundState::Open(_) => "open",
            InboundState::Failed(_) => "failed",
        };
        f.debug_struct("TonicInbound")
            .field("state", &state)
            .finish()
    }
}

impl InboundStream for TonicInbound {
    async fn recv(&mut self) -> Result<Option<Bytes>> {
        loop {
            match &mut self.state {
                InboundState::Pending(response) => match response.await {
                    Ok(streaming) => self.state = InboundState::Open(streaming),
                    Err(error) => {
                        // The response future is spent; keep reporting why.
                        self.state = InboundState::Failed(error.clone());
                        return Err(error);
                    }
                },
                InboundState::Open(streaming) => {
                    return streaming.message().await.map_err(status_to_error);
                }
                InboundState::Failed(error) => return Err(error.clone()),
            }
        }
    }
}

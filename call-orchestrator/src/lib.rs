//! Deadline-bounded orchestration of the four RPC call shapes.
//!
//! This crate drives unary, server-streaming, client-streaming and
//! bidirectional-streaming calls over any transport that implements
//! [`Transport`]. It handles:
//! - send/receive sequencing for every call shape
//! - per-call deadlines and channel-wide shutdown
//! - delivery of streamed items as they arrive or once at completion
//! - folding every terminal state into a single [`CallOutcome`]
//!
//! It does NOT contain message definitions or stub generation. Messages only
//! need to implement [`WireMessage`], which is provided for every prost
//! message when the `codegen-prost` feature is enabled.
//!
//! # Example
//!
//! ```ignore
//! use call_orchestrator::{CallConfig, ChannelConfig, Orchestrator, TonicTransport};
//!
//! let channel = ChannelConfig::new("127.0.0.1", "10000").plaintext();
//! let transport = TonicTransport::connect(&channel).await?;
//! let orchestrator = Orchestrator::new(transport, CallConfig::default());
//!
//! let outcome = orchestrator
//!     .unary::<GetFeature>(point, orchestrator.config().unary_deadline)
//!     .await;
//!
//! match outcome {
//!     CallOutcome::Success(feature) => println!("{}", feature.name),
//!     CallOutcome::Failure(failure) => eprintln!("{}", failure.reason),
//! }
//!
//! orchestrator.shutdown().await;
//! ```
//!
//! # Feature Flags
//!
//! - `transport-tonic`: Enables [`TonicTransport`], a transport over `tonic` channels.
//!   Enabled by default.
//! - `codegen-prost`: Implements [`WireMessage`] for every `prost` message. Enabled by default.
//! - `test-util`: Enables the scripted [`testutil::MockTransport`].

pub mod config;
pub mod error;
pub mod method;
pub mod orchestrator;
pub mod outcome;
pub mod sink;
pub mod state;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testutil;

pub use config::{CallConfig, DeliveryPolicy};
pub use error::{Error, Result};
pub use method::{Method, WireMessage};
pub use orchestrator::Orchestrator;
pub use outcome::{CallOutcome, Failure, FailureKind, StreamStats};
pub use sink::{Delivery, PresentationSink, ResultSink, TracingSink};
pub use state::CallState;
pub use transport::{BoxFuture, CallContext, InboundStream, OutboundStream, Transport};

// Tonic transport
#[cfg(feature = "transport-tonic")]
pub use transport::tonic::{ChannelConfig, TlsConfig, TonicTransport};

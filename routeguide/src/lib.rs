//! The RouteGuide service, orchestrated.
//!
//! This crate binds the four RouteGuide methods to
//! [`call_orchestrator`]. It contains:
//! - [`pb`]: the RouteGuide messages and the generated server trait
//! - [`client::RouteGuideClient`]: renders call outcomes into a result sink
//! - [`server::RouteGuideService`]: an in-memory server over a feature database
//! - [`data`]: loading of the JSON feature database
//!
//! The method descriptors in this module ([`GetFeature`], [`ListFeatures`],
//! [`RecordRoute`], [`RouteChat`]) tell the orchestrator which messages
//! cross the wire for each path.

pub mod client;
pub mod data;
pub mod error;
pub mod server;

pub use client::RouteGuideClient;
pub use error::{Error, Result};
pub use server::RouteGuideService;

use call_orchestrator::Method;

/// RouteGuide messages and the generated server.
#[allow(missing_docs, unreachable_pub, clippy::derive_partial_eq_without_eq)]
pub mod pb {
    include!("generated/routeguide.rs");
}

/// `rpc GetFeature(Point) returns (Feature)`
#[derive(Debug, Clone, Copy)]
pub struct GetFeature;

impl Method for GetFeature {
    type Request = pb::Point;
    type Response = pb::Feature;
    const PATH: &'static str = "/routeguide.RouteGuide/GetFeature";
}

/// `rpc ListFeatures(Rectangle) returns (stream Feature)`
#[derive(Debug, Clone, Copy)]
pub struct ListFeatures;

impl Method for ListFeatures {
    type Request = pb::Rectangle;
    type Response = pb::Feature;
    const PATH: &'static str = "/routeguide.RouteGuide/ListFeatures";
}

/// `rpc RecordRoute(stream Point) returns (RouteSummary)`
#[derive(Debug, Clone, Copy)]
pub struct RecordRoute;

impl Method for RecordRoute {
    type Request = pb::Point;
    type Response = pb::RouteSummary;
    const PATH: &'static str = "/routeguide.RouteGuide/RecordRoute";
}

/// `rpc RouteChat(stream RouteNote) returns (stream RouteNote)`
#[derive(Debug, Clone, Copy)]
pub struct RouteChat;

impl Method for RouteChat {
    type Request = pb::RouteNote;
    type Response = pb::RouteNote;
    const PATH: &'static str = "/routeguide.RouteGuide/RouteChat";
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
pub fn trace_init() {
    let sub = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();

    let _ = tracing::subscriber::set_global_default(sub);
}

//! Typed descriptions of the methods an orchestrator can call.
//!
//! Transports move raw bytes; the orchestrator encodes requests and decodes
//! responses with [`WireMessage`], so a transport never needs to know which
//! protobuf implementation generated the messages.

use bytes::Bytes;

use crate::error::Result;

/// A message that can be written to and read from the wire.
pub trait WireMessage: Sized + Send + 'static {
    /// Serialize the message.
    fn encode_bytes(&self) -> Bytes;

    /// Deserialize a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`](crate::Error::Decode) if `bytes` is not a
    /// valid encoding of `Self`.
    fn decode_bytes(bytes: Bytes) -> Result<Self>;
}

#[cfg(feature = "codegen-prost")]
impl<T> WireMessage for T
where
    T: prost::Message + Default + 'static,
{
    fn encode_bytes(&self) -> Bytes {
        self.encode_to_vec().into()
    }

    fn decode_bytes(bytes: Bytes) -> Result<Self> {
        T::decode(bytes)
            .map_err(|e| crate::Error::Decode(e.to_string()))
    }
}

/// Describes one RPC method.
///
/// # Example
///
/// ```ignore
/// struct GetFeature;
///
/// impl Method for GetFeature {
///     type Request = Point;
///     type Response = Feature;
///     const PATH: &'static str = "/routeguide.RouteGuide/GetFeature";
/// }
/// ```
pub trait Method {
    /// Message sent by the client.
    type Request: WireMessage;

    /// Message sent by the server.
    type Response: WireMessage;

    /// Full method path, `/<package>.<Service>/<Method>`.
    const PATH: &'static str;

    /// Method name, used in logs.
    fn name() -> &'static str {
        Self::PATH.rsplit('/').next().unwrap_or(Self::PATH)
    }
}

#[cfg(all(test, feature = "codegen-prost"))]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, prost::Message)]
    struct Ping {
        #[prost(uint32, tag = "1")]
        seq: u32,
    }

    struct PingMethod;

    impl Method for PingMethod {
        type Request = Ping;
        type Response = Ping;
        const PATH: &'static str = "/test.Pinger/Ping";
    }

    #[test]
    fn prost_messages_are_wire_messages() {
        let bytes = Ping { seq: 7 }.encode_bytes();
        assert_eq!(Ping::decode_bytes(bytes).unwrap(), Ping { seq: 7 });
    }

    #[test]
    fn malformed_bytes_fail_to_decode() {
        let err = Ping::decode_bytes(Bytes::from_static(&[0x08])).unwrap_err();
        assert!(matches!(err, crate::Error::Decode(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn method_name_is_the_last_path_segment() {
        assert_eq!(PingMethod::name(), "Ping");
    }
}

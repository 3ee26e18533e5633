use multipeer_core::MediaStream;

/// Construction options handed to a [`TransportFactory`](super::TransportFactory).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerOptions {
    /// The initiating side produces the first handshake payload.
    pub initiator: bool,
    pub trickle: bool,
    /// Streams the new peer must carry from the start (the server's broadcast streams).
    pub streams: Vec<MediaStream>,
}

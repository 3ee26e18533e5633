use crate::transport::PeerHandle;
use multipeer_core::PeerId;

#[derive(Debug, Clone)]
pub struct PeerEntry {
    pub id: PeerId,
    pub transport: PeerHandle,
    /// Set once on the transport's connect event and never cleared.
    pub connected: bool,
    pub initiator: bool,
}

impl PeerEntry {
    pub fn new(id: PeerId, transport: PeerHandle, initiator: bool) -> Self {
        Self {
            id,
            transport,
            connected: false,
            initiator,
        }
    }
}

use bytes::Bytes;
use multipeer_core::{MediaStream, MediaTrack, PeerId, SignalPayload};
use tokio::sync::mpsc;

/// Lifecycle events a transport peer reports to the coordinator.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Negotiation or channel failure. The peer is not assumed dead.
    Error(PeerId, String),

    /// Local handshake payload that must be relayed to the remote side.
    Signal(PeerId, SignalPayload),

    /// The direct connection is up and can carry data.
    Connect(PeerId),

    Data(PeerId, Bytes),

    Stream(PeerId, MediaStream),

    Track(PeerId, MediaTrack, MediaStream),

    Close(PeerId),
}

/// Per-peer event sink given to a transport backend at creation time.
///
/// Cheap to clone into callbacks. Emitting after the coordinator stopped is a no-op.
#[derive(Debug, Clone)]
pub struct PeerEvents {
    peer_id: PeerId,
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl PeerEvents {
    pub fn new(peer_id: PeerId, tx: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self { peer_id, tx }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn error(&self, detail: impl Into<String>) {
        self.emit(TransportEvent::Error(self.peer_id.clone(), detail.into()));
    }

    pub fn signal(&self, payload: SignalPayload) {
        self.emit(TransportEvent::Signal(self.peer_id.clone(), payload));
    }

    pub fn connect(&self) {
        self.emit(TransportEvent::Connect(self.peer_id.clone()));
    }

    pub fn data(&self, data: impl Into<Bytes>) {
        self.emit(TransportEvent::Data(self.peer_id.clone(), data.into()));
    }

    pub fn stream(&self, stream: MediaStream) {
        self.emit(TransportEvent::Stream(self.peer_id.clone(), stream));
    }

    pub fn track(&self, track: MediaTrack, stream: MediaStream) {
        self.emit(TransportEvent::Track(self.peer_id.clone(), track, stream));
    }

    pub fn close(&self) {
        self.emit(TransportEvent::Close(self.peer_id.clone()));
    }

    fn emit(&self, event: TransportEvent) {
        let _ = self.tx.send(event);
    }
}

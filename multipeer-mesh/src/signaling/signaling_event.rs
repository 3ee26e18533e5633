use multipeer_core::{PeerId, SignalPayload};
use tokio::sync::mpsc;

/// Notifications the signaling service delivers to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalingEvent {
    /// Number of members in the joined room, this session included.
    RoomCount(usize),

    /// Identity assigned to this session.
    SocketId(PeerId),

    /// A participant left. Delivered for every departure in the room, even
    /// for peers this session never connected to.
    Destroy(PeerId),

    /// Handshake payload relayed from `PeerId`.
    Signal(PeerId, SignalPayload),

    /// Server only: a client joined the room hosted by `host` and must be initiated toward.
    Initialize { host: PeerId, peer_id: PeerId },
}

/// Sink a [`SignalingService`](super::SignalingService) pushes its events into.
#[derive(Debug, Clone)]
pub struct SignalingEvents {
    tx: mpsc::UnboundedSender<SignalingEvent>,
}

impl SignalingEvents {
    pub fn new(tx: mpsc::UnboundedSender<SignalingEvent>) -> Self {
        Self { tx }
    }

    pub fn room_count(&self, count: usize) {
        self.emit(SignalingEvent::RoomCount(count));
    }

    pub fn socket_id(&self, id: PeerId) {
        self.emit(SignalingEvent::SocketId(id));
    }

    pub fn destroy(&self, id: PeerId) {
        self.emit(SignalingEvent::Destroy(id));
    }

    pub fn signal(&self, from: PeerId, payload: SignalPayload) {
        self.emit(SignalingEvent::Signal(from, payload));
    }

    pub fn initialize(&self, host: PeerId, peer_id: PeerId) {
        self.emit(SignalingEvent::Initialize { host, peer_id });
    }

    pub fn emit(&self, event: SignalingEvent) {
        let _ = self.tx.send(event);
    }
}

use crate::transport::PeerHandle;
use multipeer_core::{Inbound, MediaStream, MediaTrack, PeerId};
use std::fmt;

/// Failure reported by a transport peer.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerError {
    pub error: String,
    /// Whether this side initiated the failing connection.
    pub initiator: bool,
}

/// Public notifications of a mesh session.
#[derive(Debug, Clone)]
pub enum MeshEvent {
    RoomCount(usize),
    SocketId(PeerId),
    Connect(PeerId),
    Disconnect(PeerId),
    /// The role's completeness policy just became satisfied.
    FullConnect,
    Data {
        peer_id: PeerId,
        payload: Inbound,
    },
    Stream {
        peer_id: PeerId,
        stream: MediaStream,
    },
    Track {
        track: MediaTrack,
        peer_id: PeerId,
        stream: MediaStream,
    },
    Error {
        peer: PeerHandle,
        peer_id: PeerId,
        detail: PeerError,
    },
}

impl MeshEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MeshEvent::RoomCount(_) => EventKind::RoomCount,
            MeshEvent::SocketId(_) => EventKind::SocketId,
            MeshEvent::Connect(_) => EventKind::Connect,
            MeshEvent::Disconnect(_) => EventKind::Disconnect,
            MeshEvent::FullConnect => EventKind::FullConnect,
            MeshEvent::Data { .. } => EventKind::Data,
            MeshEvent::Stream { .. } => EventKind::Stream,
            MeshEvent::Track { .. } => EventKind::Track,
            MeshEvent::Error { .. } => EventKind::Error,
        }
    }
}

/// Event names, used to wait for one particular notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RoomCount,
    SocketId,
    Connect,
    Disconnect,
    FullConnect,
    Data,
    Stream,
    Track,
    Error,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::RoomCount => "room-count",
            EventKind::SocketId => "socket-id",
            EventKind::Connect => "connect",
            EventKind::Disconnect => "disconnect",
            EventKind::FullConnect => "full-connect",
            EventKind::Data => "data",
            EventKind::Stream => "stream",
            EventKind::Track => "track",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

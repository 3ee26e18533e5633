use crate::transport::{PeerEvents, PeerOptions};
use async_trait::async_trait;
use bytes::Bytes;
use multipeer_core::{MediaStream, PeerId, SignalPayload};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Point-to-point connection to one remote participant.
///
/// The mesh never looks inside the negotiation; it only relays handshake
/// payloads in and out and reacts to the events the peer reports through
/// its [`PeerEvents`] sink.
#[async_trait]
pub trait TransportPeer: Send + Sync + 'static {
    async fn send(&self, data: Bytes) -> anyhow::Result<()>;

    /// Feed a handshake payload received from the remote side.
    async fn signal(&self, payload: SignalPayload) -> anyhow::Result<()>;

    /// Release the connection. Calling it twice may fail; callers ignore that.
    async fn destroy(&self) -> anyhow::Result<()>;

    async fn add_stream(&self, stream: &MediaStream) -> anyhow::Result<()>;

    async fn remove_stream(&self, stream: &MediaStream) -> anyhow::Result<()>;

    fn connected(&self) -> bool;
}

/// Creates transport peers on demand. Injected at session construction.
#[async_trait]
pub trait TransportFactory: Send + Sync + 'static {
    async fn create(
        &self,
        peer_id: PeerId,
        options: PeerOptions,
        events: PeerEvents,
    ) -> anyhow::Result<Arc<dyn TransportPeer>>;
}

/// Shared handle to a transport peer owned by the registry.
#[derive(Clone)]
pub struct PeerHandle {
    peer_id: PeerId,
    inner: Arc<dyn TransportPeer>,
}

impl PeerHandle {
    pub fn new(peer_id: PeerId, inner: Arc<dyn TransportPeer>) -> Self {
        Self { peer_id, inner }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn ptr_eq(&self, other: &PeerHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for PeerHandle {
    type Target = dyn TransportPeer;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerHandle")
            .field("peer_id", &self.peer_id)
            .field("connected", &self.inner.connected())
            .finish()
    }
}

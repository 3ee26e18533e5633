use crate::signaling::SignalingEvents;
use async_trait::async_trait;
use multipeer_core::{PeerId, SignalPayload};

/// Out-of-band rendezvous channel: assigns identities, announces room
/// membership and relays handshake payloads between participants.
///
/// Implementations push everything they receive into the [`SignalingEvents`]
/// sink handed to [`connect`](SignalingService::connect).
#[async_trait]
pub trait SignalingService: Send + Sync + 'static {
    /// Establish the control channel. Resolves once it is usable.
    async fn connect(
        &self,
        url: &str,
        websocket_only: bool,
        events: SignalingEvents,
    ) -> anyhow::Result<()>;

    async fn join(&self, app_name: &str, room: &str, password: &str) -> anyhow::Result<()>;

    async fn create(
        &self,
        app_name: &str,
        room: &str,
        password: &str,
        hidden: bool,
    ) -> anyhow::Result<()>;

    /// Relay `payload` to `peer_id`, who receives it as a signal event.
    async fn message(&self, peer_id: &PeerId, kind: &str, payload: SignalPayload)
    -> anyhow::Result<()>;

    async fn destroy(&self) -> anyhow::Result<()>;

    /// Latest room size the service knows of, if any. Read once when the
    /// session starts; later changes arrive as room-count events.
    fn room_count(&self) -> Option<usize>;

    /// Endpoint the control channel is connected to.
    fn url(&self) -> Option<String>;
}

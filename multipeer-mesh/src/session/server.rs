use crate::error::Result;
use crate::session::handle::{MeshSession, SessionBuilder};
use crate::session::session_command::{SessionCommand, Target};
use bytes::Bytes;
use multipeer_core::{MediaStream, Payload, PeerId};
use std::ops::Deref;

/// Hub of a star topology: creates the room and initiates toward every joiner.
#[derive(Clone)]
pub struct MeshServer {
    session: MeshSession,
}

impl MeshServer {
    pub(crate) fn new(session: MeshSession) -> Self {
        Self { session }
    }

    pub async fn connect(builder: SessionBuilder, url: &str) -> Result<Self> {
        builder.connect_server(url).await
    }

    /// Ask the signaling service to create `room`. Clients joining it will be
    /// announced and connected to as they arrive.
    pub async fn create(
        &self,
        room: impl Into<String>,
        password: impl Into<String>,
        hidden: bool,
    ) -> Result<()> {
        self.session
            .command(SessionCommand::Create {
                room: room.into(),
                password: password.into(),
                hidden,
            })
            .await
    }

    /// Send to every registered peer.
    pub async fn broadcast(&self, payload: impl Into<Payload>) -> Result<()> {
        self.dispatch(Target::All, payload.into()).await
    }

    pub async fn broadcast_raw(&self, data: impl Into<Bytes>) -> Result<()> {
        self.dispatch(Target::All, Payload::Raw(data.into())).await
    }

    pub async fn send(&self, peer_id: &PeerId, payload: impl Into<Payload>) -> Result<()> {
        self.dispatch(Target::Peer(peer_id.clone()), payload.into())
            .await
    }

    pub async fn send_raw(&self, peer_id: &PeerId, data: impl Into<Bytes>) -> Result<()> {
        self.dispatch(Target::Peer(peer_id.clone()), Payload::Raw(data.into()))
            .await
    }

    /// Attach `stream` to every current peer and to every peer created later.
    pub async fn broadcast_stream(&self, stream: MediaStream) -> Result<()> {
        self.session
            .command(SessionCommand::BroadcastStream(stream))
            .await
    }

    pub async fn broadcast_remove_stream(&self, stream: MediaStream) -> Result<()> {
        self.session
            .command(SessionCommand::BroadcastRemoveStream(stream))
            .await
    }

    pub async fn send_stream(&self, peer_id: &PeerId, stream: MediaStream) -> Result<()> {
        self.session
            .command(SessionCommand::AddStream {
                target: Target::Peer(peer_id.clone()),
                stream,
            })
            .await
    }

    pub async fn remove_stream(&self, peer_id: &PeerId, stream: MediaStream) -> Result<()> {
        self.session
            .command(SessionCommand::RemoveStream {
                target: Target::Peer(peer_id.clone()),
                stream,
            })
            .await
    }

    pub fn session(&self) -> &MeshSession {
        &self.session
    }

    async fn dispatch(&self, target: Target, payload: Payload) -> Result<()> {
        self.session
            .command(SessionCommand::Send { target, payload })
            .await
    }
}

impl Deref for MeshServer {
    type Target = MeshSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

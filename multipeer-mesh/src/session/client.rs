use crate::error::Result;
use crate::events::{EventKind, MeshEvent};
use crate::registry::PeerEntry;
use crate::session::handle::{MeshSession, SessionBuilder};
use crate::session::session_command::{SessionCommand, Target};
use bytes::Bytes;
use multipeer_core::{MediaStream, Payload, PeerId};
use std::ops::Deref;
use tracing::{debug, info};

/// Client side of a star topology: joins a room and talks to the server peer only.
#[derive(Clone)]
pub struct MeshClient {
    session: MeshSession,
}

impl MeshClient {
    pub(crate) fn new(session: MeshSession) -> Self {
        Self { session }
    }

    pub async fn connect(builder: SessionBuilder, url: &str) -> Result<Self> {
        builder.connect_client(url).await
    }

    /// Join `room` and wait until the mesh with the server is established.
    ///
    /// Fails with a timeout if the signaling service never reports the room
    /// size, or if the room has other members and the server connection does
    /// not complete in time.
    pub async fn join(&self, room: impl Into<String>, password: impl Into<String>) -> Result<()> {
        let config = self.session.config();
        // Subscribe before the request goes out so no reply can be missed.
        let mut waiter = self.session.waiter();

        self.session
            .command(SessionCommand::Join {
                room: room.into(),
                password: password.into(),
            })
            .await?;

        let count = match waiter
            .wait_for(EventKind::RoomCount, Some(config.room_count_timeout))
            .await?
        {
            MeshEvent::RoomCount(count) => count,
            _ => 0,
        };

        let fully_connected = self.session.check_full_connect().await?;
        if count > 1 && !fully_connected {
            debug!("[client] Room has {} members, waiting for the mesh", count);
            waiter
                .wait_for(EventKind::FullConnect, Some(config.full_connect_timeout))
                .await?;
        }

        info!("[client] Joined room '{}'", self.session.room());
        Ok(())
    }

    /// Send to the server peer. A no-op while no peer is connected.
    pub async fn send(&self, payload: impl Into<Payload>) -> Result<()> {
        self.session
            .command(SessionCommand::Send {
                target: Target::Counterpart,
                payload: payload.into(),
            })
            .await
    }

    /// Send bytes without structured encoding.
    pub async fn send_raw(&self, data: impl Into<Bytes>) -> Result<()> {
        self.send(Payload::Raw(data.into())).await
    }

    pub async fn send_stream(&self, stream: MediaStream) -> Result<()> {
        self.session
            .command(SessionCommand::AddStream {
                target: Target::Counterpart,
                stream,
            })
            .await
    }

    pub async fn remove_stream(&self, stream: MediaStream) -> Result<()> {
        self.session
            .command(SessionCommand::RemoveStream {
                target: Target::Counterpart,
                stream,
            })
            .await
    }

    pub fn server_peer(&self) -> Option<PeerEntry> {
        self.session.registry().first_connected()
    }

    pub fn server_peer_id(&self) -> Option<PeerId> {
        self.server_peer().map(|entry| entry.id)
    }

    pub fn session(&self) -> &MeshSession {
        &self.session
    }
}

impl Deref for MeshClient {
    type Target = MeshSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

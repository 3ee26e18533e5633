use crate::config::SessionConfig;
use crate::discovery::{RoomDirectory, server_rooms};
use crate::error::{MeshError, Result};
use crate::events::{EventKind, EventWaiter, MeshEvent};
use crate::registry::{PeerEntry, PeerRegistry};
use crate::session::coordinator::{Coordinator, CoordinatorChannels};
use crate::session::role::RolePolicy;
use crate::session::session_command::SessionCommand;
use crate::session::session_snapshot::SessionSnapshot;
use crate::signaling::{SignalingAdapter, SignalingEvents, SignalingService};
use crate::transport::TransportFactory;
use multipeer_core::{MediaStream, PeerId, RoomDescriptor, Role, SessionState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::info;

struct SessionShared {
    config: SessionConfig,
    command_tx: mpsc::Sender<SessionCommand>,
    /// Never polled; only used to hand out fresh subscriptions.
    events: broadcast::Receiver<MeshEvent>,
    snapshot: watch::Receiver<SessionSnapshot>,
    registry: PeerRegistry,
    signaling: SignalingAdapter,
    directory: Option<Arc<dyn RoomDirectory>>,
}

/// Role-independent handle to a running mesh session.
///
/// Cheap to clone. The session stops when [`destroy`](MeshSession::destroy)
/// is called or the last handle is dropped.
#[derive(Clone)]
pub struct MeshSession {
    shared: Arc<SessionShared>,
}

impl MeshSession {
    pub(crate) async fn start(
        role: Role,
        builder: SessionBuilder,
        url: &str,
    ) -> Result<Self> {
        let SessionBuilder {
            config,
            signaling,
            factory,
            directory,
        } = builder;

        let (signaling_tx, signaling_rx) = mpsc::unbounded_channel();
        signaling
            .connect(url, config.websocket_only, SignalingEvents::new(signaling_tx))
            .await
            .map_err(MeshError::Signaling)?;
        info!("[{}] Signaling connected to {}", role, url);

        let (command_tx, command_rx) = mpsc::channel(config.command_capacity);
        let (events_tx, events_rx) = broadcast::channel(config.event_capacity);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot {
            state: SessionState {
                app_name: config.app_name.clone(),
                room: String::new(),
                role,
            },
            room_count: signaling.room_count(),
            local_id: None,
            fully_connected: false,
            broadcasted_streams: Vec::new(),
        });

        let registry = PeerRegistry::new();
        let adapter = SignalingAdapter::new(signaling, role);

        let coordinator = Coordinator::new(
            RolePolicy::new(role),
            config.clone(),
            registry.clone(),
            adapter.clone(),
            factory,
            CoordinatorChannels {
                command_rx,
                signaling_rx,
                events: events_tx,
                snapshot: snapshot_tx,
            },
        );
        tokio::spawn(coordinator.run());

        Ok(Self {
            shared: Arc::new(SessionShared {
                config,
                command_tx,
                events: events_rx,
                snapshot: snapshot_rx,
                registry,
                signaling: adapter,
                directory,
            }),
        })
    }

    pub(crate) async fn command(&self, cmd: SessionCommand) -> Result<()> {
        self.shared
            .command_tx
            .send(cmd)
            .await
            .map_err(|_| MeshError::SessionClosed)
    }

    /// Re-run the completeness check inside the coordinator and return its result.
    pub async fn check_full_connect(&self) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.command(SessionCommand::CheckFullConnect { reply }).await?;
        rx.await.map_err(|_| MeshError::SessionClosed)
    }

    /// New subscription to the public event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<MeshEvent> {
        self.shared.events.resubscribe()
    }

    /// Waiter over events published from now on.
    pub fn waiter(&self) -> EventWaiter {
        EventWaiter::new(self.subscribe())
    }

    /// Resolve with the next `kind` event, or fail after `timeout`.
    pub async fn wait_for(&self, kind: EventKind, timeout: Option<Duration>) -> Result<MeshEvent> {
        self.waiter().wait_for(kind, timeout).await
    }

    /// Stop the session: closes signaling, releases every transport peer.
    pub async fn destroy(&self) {
        let (reply, rx) = oneshot::channel();
        if self.command(SessionCommand::Destroy { reply }).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Rooms of this application listed by the signaling service at `url`.
    /// `None` when no directory is configured or the listing fails.
    pub async fn server_rooms(&self, url: &str) -> Option<Vec<RoomDescriptor>> {
        let directory = self.shared.directory.as_ref()?;
        server_rooms(directory.as_ref(), url, &self.shared.config.app_name).await
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.shared.registry
    }

    pub fn peers(&self) -> Vec<PeerEntry> {
        self.shared.registry.all()
    }

    pub fn connected_count(&self) -> usize {
        self.shared.registry.connected_count()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    pub fn session_state(&self) -> SessionState {
        self.shared.snapshot.borrow().state.clone()
    }

    pub fn room(&self) -> String {
        self.shared.snapshot.borrow().state.room.clone()
    }

    pub fn room_count(&self) -> Option<usize> {
        self.shared.snapshot.borrow().room_count
    }

    pub fn socket_id(&self) -> Option<PeerId> {
        self.shared.snapshot.borrow().local_id.clone()
    }

    pub fn is_fully_connected(&self) -> bool {
        self.shared.snapshot.borrow().fully_connected
    }

    pub fn broadcasted_streams(&self) -> Vec<MediaStream> {
        self.shared.snapshot.borrow().broadcasted_streams.clone()
    }

    pub fn url(&self) -> Option<String> {
        self.shared.signaling.url()
    }

    pub fn role(&self) -> Role {
        self.shared.snapshot.borrow().state.role
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }
}

/// Collaborators a session is built from.
pub struct SessionBuilder {
    config: SessionConfig,
    signaling: Arc<dyn SignalingService>,
    factory: Arc<dyn TransportFactory>,
    directory: Option<Arc<dyn RoomDirectory>>,
}

impl SessionBuilder {
    pub fn new(
        config: SessionConfig,
        signaling: Arc<dyn SignalingService>,
        factory: Arc<dyn TransportFactory>,
    ) -> Self {
        Self {
            config,
            signaling,
            factory,
            directory: None,
        }
    }

    pub fn room_directory(mut self, directory: Arc<dyn RoomDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Rooms listed at `url`, without connecting first.
    pub async fn server_rooms(&self, url: &str) -> Option<Vec<RoomDescriptor>> {
        let directory = self.directory.as_ref()?;
        server_rooms(directory.as_ref(), url, &self.config.app_name).await
    }

    pub async fn connect_client(self, url: &str) -> Result<crate::MeshClient> {
        MeshSession::start(Role::Client, self, url)
            .await
            .map(crate::MeshClient::new)
    }

    pub async fn connect_server(self, url: &str) -> Result<crate::MeshServer> {
        MeshSession::start(Role::Server, self, url)
            .await
            .map(crate::MeshServer::new)
    }
}

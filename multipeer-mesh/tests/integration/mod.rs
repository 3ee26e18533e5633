pub mod connection_tests;
pub mod multi_peer_tests;

use std::sync::Arc;
use std::time::Duration;

use multipeer_core::PeerId;
use multipeer_mesh::{EventKind, MeshClient, MeshEvent, MeshServer, SessionBuilder, SessionConfig};
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::{MockPeer, MockSignaling, MockTransportFactory, next_peer};

pub const APP_NAME: &str = "test-app";
pub const SIGNALING_URL: &str = "wss://signal.test/";

/// Timeout for events the mocks trigger synchronously (ms).
pub const EVENT_TIMEOUT_MS: u64 = 1000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A connected session together with the mocks behind it.
pub struct TestMesh<H> {
    pub handle: H,
    pub signaling: MockSignaling,
    pub factory: MockTransportFactory,
    pub created: mpsc::UnboundedReceiver<Arc<MockPeer>>,
}

impl<H> TestMesh<H> {
    pub async fn next_peer(&mut self) -> Arc<MockPeer> {
        next_peer(&mut self.created, EVENT_TIMEOUT_MS).await
    }
}

pub fn test_config() -> SessionConfig {
    SessionConfig::new(APP_NAME)
}

type Mocks = (
    SessionBuilder,
    MockSignaling,
    MockTransportFactory,
    mpsc::UnboundedReceiver<Arc<MockPeer>>,
);

fn builder(config: SessionConfig) -> Mocks {
    let signaling = MockSignaling::new();
    let (factory, created) = MockTransportFactory::new();
    let builder = SessionBuilder::new(
        config,
        Arc::new(signaling.clone()),
        Arc::new(factory.clone()),
    );
    (builder, signaling, factory, created)
}

pub async fn create_test_client(config: SessionConfig) -> TestMesh<MeshClient> {
    let (builder, signaling, factory, created) = builder(config);
    let handle = builder
        .connect_client(SIGNALING_URL)
        .await
        .expect("Failed to connect client");
    TestMesh {
        handle,
        signaling,
        factory,
        created,
    }
}

pub async fn create_test_server(config: SessionConfig) -> TestMesh<MeshServer> {
    let (builder, signaling, factory, created) = builder(config);
    let handle = builder
        .connect_server(SIGNALING_URL)
        .await
        .expect("Failed to connect server");
    TestMesh {
        handle,
        signaling,
        factory,
        created,
    }
}

/// Announce `peer_id` to the server, let it initiate and complete the connection.
pub async fn connect_joiner(mesh: &mut TestMesh<MeshServer>, peer_id: &PeerId) -> Arc<MockPeer> {
    let host = mesh.handle.socket_id().unwrap_or_default();
    mesh.signaling.initialize(&host, peer_id);

    let peer = mesh.next_peer().await;
    assert_eq!(&peer.peer_id, peer_id);
    assert!(peer.options.initiator, "Server must initiate toward joiners");

    let mut waiter = mesh.handle.waiter();
    peer.fire_connect();
    waiter
        .wait_for(EventKind::Connect, Some(Duration::from_millis(EVENT_TIMEOUT_MS)))
        .await
        .expect("Connect event not published");
    peer
}

/// Drain every event currently buffered in `rx`.
pub fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<MeshEvent>) -> Vec<MeshEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

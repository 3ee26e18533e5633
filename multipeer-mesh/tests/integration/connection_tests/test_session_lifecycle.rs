use std::sync::Arc;
use std::time::Duration;

use multipeer_core::{PeerId, Role, RoomDescriptor};
use multipeer_mesh::{EventKind, MeshError, SessionBuilder};

use crate::integration::{
    APP_NAME, EVENT_TIMEOUT_MS, SIGNALING_URL, TestMesh, connect_joiner, create_test_client,
    create_test_server, init_tracing, test_config,
};
use crate::utils::{MockDirectory, MockSignaling, MockTransportFactory, SignalingCall, wait_until};

#[tokio::test]
async fn test_connect_reports_endpoint_and_state() {
    init_tracing();

    let mesh = create_test_client(test_config().with_websocket_only(true)).await;

    assert_eq!(
        mesh.signaling.calls().first(),
        Some(&SignalingCall::Connect {
            url: SIGNALING_URL.into(),
            websocket_only: true,
        })
    );
    assert_eq!(mesh.handle.url().as_deref(), Some(SIGNALING_URL));

    let state = mesh.handle.session_state();
    assert_eq!(state.app_name, APP_NAME);
    assert_eq!(state.role, Role::Client);
    assert_eq!(state.room, "");
    assert_eq!(mesh.handle.room_count(), None);
    assert_eq!(mesh.handle.socket_id(), None);
}

#[tokio::test]
async fn test_connect_failure_is_reported() {
    init_tracing();

    let (factory, _created) = MockTransportFactory::new();
    let result = SessionBuilder::new(
        test_config(),
        Arc::new(MockSignaling::failing()),
        Arc::new(factory),
    )
    .connect_server(SIGNALING_URL)
    .await;

    assert!(matches!(result, Err(MeshError::Signaling(_))));
}

#[tokio::test]
async fn test_known_room_count_is_used_from_the_start() {
    init_tracing();

    let signaling = MockSignaling::new().with_room_count(2);
    let (factory, created) = MockTransportFactory::new();
    let handle = SessionBuilder::new(
        test_config(),
        Arc::new(signaling.clone()),
        Arc::new(factory.clone()),
    )
    .connect_server(SIGNALING_URL)
    .await
    .expect("Failed to connect server");
    assert_eq!(handle.room_count(), Some(2));

    let mut mesh = TestMesh {
        handle,
        signaling,
        factory,
        created,
    };
    let mut waiter = mesh.handle.waiter();
    connect_joiner(&mut mesh, &PeerId::from("only-client")).await;
    waiter
        .wait_for(EventKind::FullConnect, Some(Duration::from_millis(EVENT_TIMEOUT_MS)))
        .await
        .expect("FullConnect not published without a room-count event");
    assert!(mesh.handle.is_fully_connected());
}

#[tokio::test]
async fn test_socket_id_is_recorded() {
    init_tracing();

    let mesh = create_test_server(test_config()).await;
    let own = PeerId::from("own-id");

    let mut waiter = mesh.handle.waiter();
    mesh.signaling.socket_id(&own);
    waiter
        .wait_for(EventKind::SocketId, Some(Duration::from_millis(EVENT_TIMEOUT_MS)))
        .await
        .expect("SocketId event not published");

    assert_eq!(mesh.handle.socket_id(), Some(own));
    assert_eq!(mesh.handle.role(), Role::Server);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_times_out() {
    init_tracing();

    let mesh = create_test_server(test_config()).await;

    let err = mesh
        .handle
        .wait_for(EventKind::FullConnect, Some(Duration::from_millis(100)))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Timeout while waiting for event full-connect to fire (timeout: 100ms)"
    );
}

#[tokio::test]
async fn test_destroy_releases_everything() {
    init_tracing();

    let mut mesh = create_test_server(test_config()).await;
    let first = connect_joiner(&mut mesh, &PeerId::from("a")).await;
    let second = connect_joiner(&mut mesh, &PeerId::from("b")).await;

    mesh.handle.destroy().await;

    assert!(mesh.signaling.was_destroyed());
    assert_eq!(first.destroy_calls(), 1);
    assert_eq!(second.destroy_calls(), 1);
    assert!(mesh.handle.registry().is_empty());
    assert!(mesh.handle.broadcasted_streams().is_empty());

    let err = mesh.handle.broadcast("late").await.unwrap_err();
    assert!(matches!(err, MeshError::SessionClosed));

    let err = mesh
        .handle
        .wait_for(EventKind::Connect, Some(Duration::from_millis(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, MeshError::SessionClosed));
}

#[tokio::test]
async fn test_dropping_every_handle_stops_the_session() {
    init_tracing();

    let mut mesh = create_test_server(test_config()).await;
    let peer = connect_joiner(&mut mesh, &PeerId::from("a")).await;

    let signaling = mesh.signaling.clone();
    drop(mesh);

    assert!(wait_until(EVENT_TIMEOUT_MS, || signaling.was_destroyed()).await);
    assert_eq!(peer.destroy_calls(), 1);
}

#[tokio::test]
async fn test_server_rooms_filters_by_application() {
    init_tracing();

    let directory = MockDirectory::serving(vec![
        RoomDescriptor::new(APP_NAME, "one"),
        RoomDescriptor::new("other-app", "two"),
        RoomDescriptor::new(APP_NAME, "three"),
    ]);
    let (factory, _created) = MockTransportFactory::new();
    let server = SessionBuilder::new(
        test_config(),
        Arc::new(MockSignaling::new()),
        Arc::new(factory),
    )
    .room_directory(Arc::new(directory.clone()))
    .connect_server(SIGNALING_URL)
    .await
    .expect("Failed to connect server");

    let rooms = server
        .server_rooms("https://signal.test")
        .await
        .expect("Listing should succeed");

    let names: Vec<_> = rooms.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["one", "three"]);
    assert_eq!(directory.requested(), vec!["https://signal.test/rooms".to_owned()]);
}

#[tokio::test]
async fn test_server_rooms_degrades_to_none() {
    init_tracing();

    let (factory, _created) = MockTransportFactory::new();
    let builder = SessionBuilder::new(
        test_config(),
        Arc::new(MockSignaling::new()),
        Arc::new(factory),
    )
    .room_directory(Arc::new(MockDirectory::unreachable()));

    assert!(builder.server_rooms("https://signal.test/").await.is_none());

    let mesh = create_test_client(test_config()).await;
    assert!(
        mesh.handle.server_rooms("https://signal.test/").await.is_none(),
        "No directory configured"
    );
}

use multipeer_core::PeerId;
use multipeer_mesh::MeshEvent;
use serde_json::json;

use crate::integration::{create_test_client, drain_events, init_tracing, test_config};
use crate::utils::settle;

#[tokio::test]
async fn test_client_is_complete_with_exactly_one_peer() {
    init_tracing();

    let mut mesh = create_test_client(test_config()).await;
    let mut events = mesh.handle.subscribe();
    let offer = json!({ "type": "offer", "sdp": "v=0" });

    let server = PeerId::from("server");
    mesh.signaling.signal_from(&server, offer.clone());
    let server_peer = mesh.next_peer().await;
    server_peer.fire_connect();
    settle().await;
    assert!(mesh.handle.is_fully_connected());
    assert_eq!(mesh.handle.server_peer_id(), Some(server.clone()));

    let intruder = PeerId::from("intruder");
    mesh.signaling.signal_from(&intruder, offer);
    let intruder_peer = mesh.next_peer().await;
    intruder_peer.fire_connect();
    settle().await;
    assert_eq!(mesh.handle.connected_count(), 2);
    assert!(!mesh.handle.is_fully_connected());

    mesh.signaling.depart(&intruder);
    settle().await;
    assert!(mesh.handle.is_fully_connected());

    let announced: Vec<MeshEvent> = drain_events(&mut events)
        .into_iter()
        .filter(|e| matches!(e, MeshEvent::FullConnect | MeshEvent::Connect(_)))
        .collect();
    assert!(matches!(
        announced.as_slice(),
        [
            MeshEvent::Connect(_),
            MeshEvent::FullConnect,
            MeshEvent::Connect(_),
            MeshEvent::FullConnect,
        ]
    ));
}

#[tokio::test]
async fn test_duplicate_connect_is_not_counted_twice() {
    init_tracing();

    let mut mesh = create_test_client(test_config()).await;
    let mut events = mesh.handle.subscribe();

    mesh.signaling
        .signal_from(&PeerId::from("server"), json!({ "type": "offer", "sdp": "v=0" }));
    let peer = mesh.next_peer().await;
    peer.fire_connect();
    peer.fire_connect();
    settle().await;

    let connects = drain_events(&mut events)
        .into_iter()
        .filter(|e| matches!(e, MeshEvent::Connect(_)))
        .count();
    assert_eq!(connects, 1);
    assert_eq!(mesh.handle.connected_count(), 1);
}

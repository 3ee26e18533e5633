use std::time::Duration;

use bytes::Bytes;
use multipeer_core::{Inbound, PeerId};
use multipeer_mesh::{EventKind, MeshEvent, SendMode};
use serde_json::{Value, json};

use crate::integration::{
    EVENT_TIMEOUT_MS, connect_joiner, create_test_server, drain_events, init_tracing, test_config,
};
use crate::utils::{settle, wait_until};

fn frame_value(frame: &Bytes) -> Value {
    serde_json::from_slice(frame).expect("Batch frame is not JSON")
}

#[tokio::test(start_paused = true)]
async fn test_one_frame_per_destination_per_tick() {
    init_tracing();

    let mut mesh = create_test_server(test_config().with_send_mode(SendMode::batched())).await;
    let p_id = PeerId::from("p");
    let q_id = PeerId::from("q");
    let p = connect_joiner(&mut mesh, &p_id).await;
    let q = connect_joiner(&mut mesh, &q_id).await;

    mesh.handle.send(&p_id, "A").await.unwrap();
    mesh.handle.send(&p_id, json!({ "b": 2 })).await.unwrap();
    mesh.handle.send(&q_id, "C").await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(wait_until(EVENT_TIMEOUT_MS, || !p.sent().is_empty() && !q.sent().is_empty()).await);

    let p_frames = p.sent();
    let q_frames = q.sent();
    assert_eq!(p_frames.len(), 1, "Both messages to p share one frame");
    assert_eq!(q_frames.len(), 1);
    assert_eq!(frame_value(&p_frames[0]), json!(["A", { "b": 2 }]));
    assert_eq!(frame_value(&q_frames[0]), json!(["C"]));
}

#[tokio::test(start_paused = true)]
async fn test_raw_payload_inside_batch() {
    init_tracing();

    let mut mesh = create_test_server(test_config().with_send_mode(SendMode::batched())).await;
    let id = PeerId::from("p");
    let peer = connect_joiner(&mut mesh, &id).await;

    mesh.handle.send_raw(&id, vec![1u8, 2, 3]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(wait_until(EVENT_TIMEOUT_MS, || !peer.sent().is_empty()).await);

    assert_eq!(frame_value(&peer.sent()[0]), json!([[1, 2, 3]]));
}

#[tokio::test(start_paused = true)]
async fn test_empty_tick_sends_nothing() {
    init_tracing();

    let mut mesh = create_test_server(test_config().with_send_mode(SendMode::batched())).await;
    let peer = connect_joiner(&mut mesh, &PeerId::from("idle")).await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(peer.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_inbound_batch_is_split_in_order() {
    init_tracing();

    let mut mesh = create_test_server(test_config().with_send_mode(SendMode::batched())).await;
    let id = PeerId::from("p");
    let peer = connect_joiner(&mut mesh, &id).await;

    let mut events = mesh.handle.subscribe();
    let mut waiter = mesh.handle.waiter();
    peer.fire_data(Bytes::from_static(br#"[{"n":1},"hi",[7]]"#));
    waiter
        .wait_for(EventKind::Data, Some(Duration::from_millis(EVENT_TIMEOUT_MS)))
        .await
        .unwrap();
    settle().await;

    let received: Vec<Inbound> = drain_events(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            MeshEvent::Data { peer_id, payload } if peer_id == id => Some(payload),
            _ => None,
        })
        .collect();
    assert_eq!(
        received,
        vec![
            Inbound::Structured(json!({ "n": 1 })),
            Inbound::Text("hi".into()),
            Inbound::Structured(json!([7])),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_malformed_inbound_batch_is_dropped() {
    init_tracing();

    let mut mesh = create_test_server(test_config().with_send_mode(SendMode::batched())).await;
    let peer = connect_joiner(&mut mesh, &PeerId::from("p")).await;

    let mut events = mesh.handle.subscribe();
    peer.fire_data(Bytes::from_static(b"definitely not a batch"));
    settle().await;

    assert!(drain_events(&mut events).is_empty());
    assert_eq!(mesh.handle.connected_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_destroy_discards_queued_messages() {
    init_tracing();

    let mut mesh = create_test_server(test_config().with_send_mode(SendMode::batched())).await;
    let id = PeerId::from("p");
    let peer = connect_joiner(&mut mesh, &id).await;

    mesh.handle.send(&id, "never delivered").await.unwrap();
    mesh.handle.destroy().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(peer.sent().is_empty());
}

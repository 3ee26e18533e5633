use async_trait::async_trait;
use multipeer_core::{PeerId, SignalPayload};
use multipeer_mesh::{SignalingEvent, SignalingEvents, SignalingService};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum SignalingCall {
    Connect {
        url: String,
        websocket_only: bool,
    },
    Join {
        app_name: String,
        room: String,
        password: String,
    },
    Create {
        app_name: String,
        room: String,
        password: String,
        hidden: bool,
    },
    Message {
        peer_id: PeerId,
        kind: String,
        payload: SignalPayload,
    },
    Destroy,
}

/// Mock SignalingService that records outbound calls and lets the test
/// inject inbound events.
#[derive(Clone, Default)]
pub struct MockSignaling {
    calls: Arc<Mutex<Vec<SignalingCall>>>,
    events: Arc<Mutex<Option<SignalingEvents>>>,
    url: Arc<Mutex<Option<String>>>,
    room_count: Arc<Mutex<Option<usize>>>,
    /// Room count reported back as soon as a join request arrives.
    join_reply: Arc<Mutex<Option<usize>>>,
    fail_connect: bool,
}

impl MockSignaling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_connect: true,
            ..Self::default()
        }
    }

    /// Report `count` as already known before any room-count event.
    pub fn with_room_count(self, count: usize) -> Self {
        *self.room_count.lock().unwrap() = Some(count);
        self
    }

    /// Answer every join request with a room-count notification.
    pub fn reply_to_join(&self, count: usize) {
        *self.join_reply.lock().unwrap() = Some(count);
    }

    pub fn emit(&self, event: SignalingEvent) {
        if let SignalingEvent::RoomCount(count) = event {
            *self.room_count.lock().unwrap() = Some(count);
        }
        self.events
            .lock()
            .unwrap()
            .as_ref()
            .expect("MockSignaling is not connected")
            .emit(event);
    }

    pub fn room_count_event(&self, count: usize) {
        self.emit(SignalingEvent::RoomCount(count));
    }

    pub fn socket_id(&self, id: &PeerId) {
        self.emit(SignalingEvent::SocketId(id.clone()));
    }

    pub fn depart(&self, id: &PeerId) {
        self.emit(SignalingEvent::Destroy(id.clone()));
    }

    pub fn signal_from(&self, id: &PeerId, payload: SignalPayload) {
        self.emit(SignalingEvent::Signal(id.clone(), payload));
    }

    pub fn initialize(&self, host: &PeerId, peer_id: &PeerId) {
        self.emit(SignalingEvent::Initialize {
            host: host.clone(),
            peer_id: peer_id.clone(),
        });
    }

    pub fn calls(&self) -> Vec<SignalingCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Payloads relayed to `peer_id`, with their message kind.
    pub fn messages_to(&self, peer_id: &PeerId) -> Vec<(String, SignalPayload)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SignalingCall::Message {
                    peer_id: id,
                    kind,
                    payload,
                } if &id == peer_id => Some((kind, payload)),
                _ => None,
            })
            .collect()
    }

    pub fn was_destroyed(&self) -> bool {
        self.calls().contains(&SignalingCall::Destroy)
    }

    fn record(&self, call: SignalingCall) {
        tracing::debug!("[MockSignaling] {:?}", call);
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SignalingService for MockSignaling {
    async fn connect(
        &self,
        url: &str,
        websocket_only: bool,
        events: SignalingEvents,
    ) -> anyhow::Result<()> {
        self.record(SignalingCall::Connect {
            url: url.to_owned(),
            websocket_only,
        });
        if self.fail_connect {
            anyhow::bail!("connection refused");
        }
        *self.events.lock().unwrap() = Some(events);
        *self.url.lock().unwrap() = Some(url.to_owned());
        Ok(())
    }

    async fn join(&self, app_name: &str, room: &str, password: &str) -> anyhow::Result<()> {
        self.record(SignalingCall::Join {
            app_name: app_name.to_owned(),
            room: room.to_owned(),
            password: password.to_owned(),
        });
        let reply = *self.join_reply.lock().unwrap();
        if let Some(count) = reply {
            self.room_count_event(count);
        }
        Ok(())
    }

    async fn create(
        &self,
        app_name: &str,
        room: &str,
        password: &str,
        hidden: bool,
    ) -> anyhow::Result<()> {
        self.record(SignalingCall::Create {
            app_name: app_name.to_owned(),
            room: room.to_owned(),
            password: password.to_owned(),
            hidden,
        });
        Ok(())
    }

    async fn message(
        &self,
        peer_id: &PeerId,
        kind: &str,
        payload: SignalPayload,
    ) -> anyhow::Result<()> {
        self.record(SignalingCall::Message {
            peer_id: peer_id.clone(),
            kind: kind.to_owned(),
            payload,
        });
        Ok(())
    }

    async fn destroy(&self) -> anyhow::Result<()> {
        self.record(SignalingCall::Destroy);
        Ok(())
    }

    fn room_count(&self) -> Option<usize> {
        *self.room_count.lock().unwrap()
    }

    fn url(&self) -> Option<String> {
        self.url.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_mock_signaling_replies_to_join() {
        let signaling = MockSignaling::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        signaling
            .connect("ws://localhost", false, SignalingEvents::new(tx))
            .await
            .unwrap();
        signaling.reply_to_join(3);

        signaling.join("app", "room", "").await.unwrap();

        assert_eq!(rx.recv().await, Some(SignalingEvent::RoomCount(3)));
        assert_eq!(signaling.room_count(), Some(3));
        assert_eq!(signaling.url().as_deref(), Some("ws://localhost"));
    }
}

use crate::signaling::SignalingService;
use multipeer_core::{PeerId, Role, SIGNAL_KIND, SignalPayload};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outbound side of the signaling service as seen by the coordinator.
///
/// Calls are fire-and-forget: failures are logged, never propagated into
/// registry state.
#[derive(Clone)]
pub struct SignalingAdapter {
    service: Arc<dyn SignalingService>,
    role: Role,
}

impl SignalingAdapter {
    pub fn new(service: Arc<dyn SignalingService>, role: Role) -> Self {
        Self { service, role }
    }

    pub async fn relay_signal(&self, peer_id: &PeerId, payload: SignalPayload) {
        debug!("[{}] Emitting signal to {}", self.role, peer_id);
        if let Err(e) = self.service.message(peer_id, SIGNAL_KIND, payload).await {
            warn!("[{}] Failed to relay signal to {}: {:?}", self.role, peer_id, e);
        }
    }

    pub async fn join(&self, app_name: &str, room: &str, password: &str) {
        if let Err(e) = self.service.join(app_name, room, password).await {
            warn!("[{}] Join request for room '{}' failed: {:?}", self.role, room, e);
        }
    }

    pub async fn create(&self, app_name: &str, room: &str, password: &str, hidden: bool) {
        if let Err(e) = self.service.create(app_name, room, password, hidden).await {
            warn!("[{}] Create request for room '{}' failed: {:?}", self.role, room, e);
        }
    }

    pub async fn destroy(&self) {
        if let Err(e) = self.service.destroy().await {
            debug!("[{}] Signaling teardown failed: {:?}", self.role, e);
        }
    }

    pub fn room_count(&self) -> Option<usize> {
        self.service.room_count()
    }

    pub fn url(&self) -> Option<String> {
        self.service.url()
    }
}

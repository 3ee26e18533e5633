use multipeer_core::{MediaStream, PeerId, SessionState};

/// Read-only view of coordinator state, refreshed after every turn that changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub room_count: Option<usize>,
    pub local_id: Option<PeerId>,
    pub fully_connected: bool,
    pub broadcasted_streams: Vec<MediaStream>,
}

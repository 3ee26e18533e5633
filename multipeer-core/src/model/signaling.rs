use serde::{Deserialize, Serialize};

/// Handshake payload relayed verbatim between transport peers.
pub type SignalPayload = serde_json::Value;

/// Message kind used when relaying handshake payloads through the signaling service.
pub const SIGNAL_KIND: &str = "signal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
}

/// Handshake payload shape understood by the native WebRTC backend.
///
/// Compatible with the payloads browser peers built on simple-peer produce,
/// so both can share one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PeerSignal {
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate { candidate: IceCandidate },
}

impl PeerSignal {
    pub fn to_payload(&self) -> serde_json::Result<SignalPayload> {
        serde_json::to_value(self)
    }

    pub fn from_payload(payload: &SignalPayload) -> serde_json::Result<Self> {
        Self::deserialize(payload)
    }
}

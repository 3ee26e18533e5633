use serde::{Deserialize, Serialize};

/// Opaque handle to an outbound or inbound media stream.
///
/// Streams are compared by id; the transport backend owns the actual media.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaStream {
    pub id: String,
}

impl MediaStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaTrack {
    pub id: String,
    /// "audio" or "video".
    pub kind: String,
}

impl MediaTrack {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
        }
    }
}

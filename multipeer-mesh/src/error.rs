use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeshError>;

#[derive(Debug, Error)]
pub enum MeshError {
    /// A bounded wait elapsed before the awaited event fired.
    #[error("Timeout while waiting for event {event} to fire (timeout: {timeout_ms}ms)")]
    Timeout { event: &'static str, timeout_ms: u128 },

    /// The coordinator task is gone (destroyed or crashed).
    #[error("Mesh session is closed")]
    SessionClosed,

    #[error("Signaling error: {0}")]
    Signaling(#[source] anyhow::Error),

    #[error("Transport error: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl MeshError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, MeshError::Timeout { .. })
    }
}

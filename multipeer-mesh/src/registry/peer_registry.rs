use crate::registry::PeerEntry;
use dashmap::DashMap;
use multipeer_core::PeerId;
use std::sync::Arc;
use tracing::debug;

/// Who this session holds a transport peer for.
///
/// Cloning shares the same table. Handles read it directly; only the
/// coordinator task writes it. Iteration order is unspecified.
#[derive(Clone, Default)]
pub struct PeerRegistry {
    peers: Arc<DashMap<PeerId, PeerEntry>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` unless its id is already registered. Returns the entry
    /// now stored under that id.
    pub(crate) fn upsert(&self, entry: PeerEntry) -> PeerEntry {
        self.peers
            .entry(entry.id.clone())
            .or_insert(entry)
            .value()
            .clone()
    }

    /// Flip `connected` for `id`. Returns false for unknown or already connected peers.
    pub(crate) fn mark_connected(&self, id: &PeerId) -> bool {
        match self.peers.get_mut(id) {
            Some(mut entry) if !entry.connected => {
                entry.connected = true;
                true
            }
            _ => false,
        }
    }

    /// Drop `id` and release its transport. Unknown ids are a no-op and
    /// release failures are swallowed: a double release is an expected race.
    pub(crate) async fn remove(&self, id: &PeerId) -> Option<PeerEntry> {
        // The map guard must be released before awaiting the transport.
        let (_, entry) = self.peers.remove(id)?;
        if let Err(e) = entry.transport.destroy().await {
            debug!("Ignoring release failure for {}: {:?}", id, e);
        }
        Some(entry)
    }

    /// Release every transport and empty the table.
    pub(crate) async fn clear(&self) {
        for id in self.ids() {
            self.remove(&id).await;
        }
    }

    pub fn get(&self, id: &PeerId) -> Option<PeerEntry> {
        self.peers.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.peers.contains_key(id)
    }

    pub fn all(&self) -> Vec<PeerEntry> {
        self.peers.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn ids(&self) -> Vec<PeerId> {
        self.peers.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn connected_count(&self) -> usize {
        self.peers.iter().filter(|entry| entry.connected).count()
    }

    /// First connected entry, used as the client's counterpart.
    pub fn first_connected(&self) -> Option<PeerEntry> {
        self.peers
            .iter()
            .find(|entry| entry.connected)
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

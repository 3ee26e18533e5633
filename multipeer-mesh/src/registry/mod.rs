mod peer_entry;
mod peer_registry;

pub use peer_entry::PeerEntry;
pub use peer_registry::PeerRegistry;

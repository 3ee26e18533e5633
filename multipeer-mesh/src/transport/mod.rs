mod peer_options;
mod transport_event;
mod transport_peer;

#[cfg(feature = "webrtc")]
pub mod webrtc;

pub use peer_options::PeerOptions;
pub use transport_event::{PeerEvents, TransportEvent};
pub use transport_peer::{PeerHandle, TransportFactory, TransportPeer};

mod media;
mod payload;
mod peer;
mod room;
mod session;
mod signaling;

pub use media::{MediaStream, MediaTrack};
pub use payload::{Inbound, Payload};
pub use peer::PeerId;
pub use room::RoomDescriptor;
pub use session::{Role, SessionState};
pub use signaling::{IceCandidate, PeerSignal, SIGNAL_KIND, SignalPayload};

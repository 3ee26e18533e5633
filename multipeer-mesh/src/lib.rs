pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod framing;
pub mod registry;
pub mod session;
pub mod signaling;
pub mod transport;

pub use config::{SendMode, SessionConfig};
pub use discovery::RoomDirectory;
pub use error::{MeshError, Result};
pub use events::{EventKind, EventWaiter, MeshEvent, PeerError};
pub use registry::{PeerEntry, PeerRegistry};
pub use session::{MeshClient, MeshServer, MeshSession, SessionBuilder, SessionSnapshot};
pub use signaling::{SignalingEvent, SignalingEvents, SignalingService};
pub use transport::{PeerEvents, PeerHandle, PeerOptions, TransportEvent, TransportFactory, TransportPeer};

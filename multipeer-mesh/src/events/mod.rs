mod event_waiter;
mod mesh_event;

pub use event_waiter::EventWaiter;
pub use mesh_event::{EventKind, MeshEvent, PeerError};

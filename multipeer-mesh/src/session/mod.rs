mod client;
mod coordinator;
mod handle;
mod role;
mod server;
mod session_command;
mod session_snapshot;

pub use client::MeshClient;
pub use handle::{MeshSession, SessionBuilder};
pub use role::{FullConnectLatch, RolePolicy};
pub use server::MeshServer;
pub use session_snapshot::SessionSnapshot;

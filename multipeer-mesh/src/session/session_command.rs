use multipeer_core::{MediaStream, Payload, PeerId};
use tokio::sync::oneshot;

/// Who an outbound operation is addressed to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Peer(PeerId),
    /// The client's sole counterpart, resolved when the command is handled.
    Counterpart,
    All,
}

/// Requests from the public handles to the coordinator task.
#[derive(Debug)]
pub enum SessionCommand {
    Join {
        room: String,
        password: String,
    },

    Create {
        room: String,
        password: String,
        hidden: bool,
    },

    Send {
        target: Target,
        payload: Payload,
    },

    AddStream {
        target: Target,
        stream: MediaStream,
    },

    RemoveStream {
        target: Target,
        stream: MediaStream,
    },

    /// Add to the broadcast registry and to every registered peer.
    BroadcastStream(MediaStream),

    BroadcastRemoveStream(MediaStream),

    /// Re-run the completeness check; replies with the current result.
    CheckFullConnect { reply: oneshot::Sender<bool> },

    Destroy { reply: oneshot::Sender<()> },
}

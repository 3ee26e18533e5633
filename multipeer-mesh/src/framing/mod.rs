mod batcher;
mod framer;

pub use batcher::{MessageBatcher, OutboundBatch};
pub use framer::MessageFramer;

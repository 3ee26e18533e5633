mod signaling_adapter;
mod signaling_event;
mod signaling_service;

pub use signaling_adapter::SignalingAdapter;
pub use signaling_event::{SignalingEvent, SignalingEvents};
pub use signaling_service::SignalingService;

//! Native transport backend over webrtc-rs data channels.

mod webrtc_config;
mod webrtc_peer;

pub use webrtc_config::WebRtcConfig;
pub use webrtc_peer::{WebRtcPeer, WebRtcTransportFactory};

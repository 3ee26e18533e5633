/// ICE configuration shared by every peer a [`WebRtcTransportFactory`](super::WebRtcTransportFactory) creates.
#[derive(Debug, Clone)]
pub struct WebRtcConfig {
    pub ice_servers: Vec<String>,
    /// Label of the data channel the initiating side opens.
    pub channel_label: String,
    /// Offer loopback addresses as ICE candidates.
    pub include_loopback: bool,
}

impl Default for WebRtcConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_owned()],
            channel_label: "data".to_owned(),
            include_loopback: false,
        }
    }
}

use crate::transport::webrtc::WebRtcConfig;
use crate::transport::{PeerEvents, PeerOptions, TransportFactory, TransportPeer};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use bytes::Bytes;
use multipeer_core::{IceCandidate, MediaStream, PeerId, PeerSignal, SignalPayload};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

type ChannelSlot = Arc<Mutex<Option<Arc<RTCDataChannel>>>>;

/// Creates [`WebRtcPeer`]s with a shared ICE configuration.
#[derive(Debug, Clone, Default)]
pub struct WebRtcTransportFactory {
    config: WebRtcConfig,
}

impl WebRtcTransportFactory {
    pub fn new(config: WebRtcConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    async fn create(
        &self,
        peer_id: PeerId,
        options: PeerOptions,
        events: PeerEvents,
    ) -> Result<Arc<dyn TransportPeer>> {
        if !options.streams.is_empty() {
            warn!(
                "{} media streams requested for {}; this backend carries data only",
                options.streams.len(),
                peer_id
            );
        }

        let peer = Arc::new(WebRtcPeer::new(&self.config, options.trickle, events).await?);

        if options.initiator {
            let channel = peer
                .peer_connection
                .create_data_channel(&self.config.channel_label, None)
                .await?;
            bind_data_channel(
                channel,
                peer.channel.clone(),
                peer.connected.clone(),
                peer.events.clone(),
            );

            if let Err(e) = peer.send_offer().await {
                peer.events.error(format!("Failed to create offer: {e:#}"));
            }
        }

        Ok(peer as Arc<dyn TransportPeer>)
    }
}

/// One data-channel connection to a remote participant.
pub struct WebRtcPeer {
    peer_connection: Arc<RTCPeerConnection>,
    channel: ChannelSlot,
    /// Remote candidates that arrived before the remote description.
    pending_candidates: Mutex<Vec<RTCIceCandidateInit>>,
    connected: Arc<AtomicBool>,
    destroyed: AtomicBool,
    trickle: bool,
    events: PeerEvents,
}

impl WebRtcPeer {
    async fn new(config: &WebRtcConfig, trickle: bool, events: PeerEvents) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let mut settings = SettingEngine::default();
        settings.set_include_loopback_candidate(config.include_loopback);

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .with_setting_engine(settings)
            .build();

        let ice_servers = if config.ice_servers.is_empty() {
            Vec::new()
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers.clone(),
                credential: String::new(),
                username: String::new(),
            }]
        };
        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);
        let channel: ChannelSlot = Arc::new(Mutex::new(None));
        let connected = Arc::new(AtomicBool::new(false));

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();

                Box::pin(async move {
                    debug!("Peer connection state for {}: {:?}", events.peer_id(), s);
                    match s {
                        RTCPeerConnectionState::Failed => {
                            events.error("Peer connection failed");
                        }
                        RTCPeerConnectionState::Disconnected | RTCPeerConnectionState::Closed => {
                            events.close();
                        }
                        _ => {}
                    }
                })
            },
        ));

        if trickle {
            let ice_events = events.clone();
            peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
                let events = ice_events.clone();

                Box::pin(async move {
                    let Some(candidate) = c else { return };
                    let init = match candidate.to_json() {
                        Ok(init) => init,
                        Err(e) => {
                            warn!("Unusable local candidate for {}: {}", events.peer_id(), e);
                            return;
                        }
                    };
                    let signal = PeerSignal::Candidate {
                        candidate: IceCandidate {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_m_line_index: init.sdp_mline_index,
                        },
                    };
                    match signal.to_payload() {
                        Ok(payload) => events.signal(payload),
                        Err(e) => warn!("Failed to encode candidate: {}", e),
                    }
                })
            }));
        }

        let dc_slot = channel.clone();
        let dc_connected = connected.clone();
        let dc_events = events.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let slot = dc_slot.clone();
            let connected = dc_connected.clone();
            let events = dc_events.clone();

            Box::pin(async move {
                debug!("Data channel '{}' opened by {}", dc.label(), events.peer_id());
                bind_data_channel(dc, slot, connected, events);
            })
        }));

        Ok(Self {
            peer_connection,
            channel,
            pending_candidates: Mutex::new(Vec::new()),
            connected,
            destroyed: AtomicBool::new(false),
            trickle,
            events,
        })
    }

    async fn send_offer(&self) -> Result<()> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.apply_local_description(offer, |sdp| PeerSignal::Offer { sdp })
            .await
    }

    async fn accept_offer(&self, sdp: String) -> Result<()> {
        self.peer_connection
            .set_remote_description(RTCSessionDescription::offer(sdp)?)
            .await?;
        self.flush_pending_candidates().await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.apply_local_description(answer, |sdp| PeerSignal::Answer { sdp })
            .await
    }

    async fn accept_answer(&self, sdp: String) -> Result<()> {
        self.peer_connection
            .set_remote_description(RTCSessionDescription::answer(sdp)?)
            .await?;
        self.flush_pending_candidates().await
    }

    /// Set the local description and hand it to the remote side. Without
    /// trickle the description is sent once ICE gathering finished, from a
    /// background task.
    async fn apply_local_description(
        &self,
        description: RTCSessionDescription,
        into_signal: fn(String) -> PeerSignal,
    ) -> Result<()> {
        if self.trickle {
            let sdp = description.sdp.clone();
            self.peer_connection.set_local_description(description).await?;
            self.events.signal(into_signal(sdp).to_payload()?);
            return Ok(());
        }

        let mut gathered = self.peer_connection.gathering_complete_promise().await;
        self.peer_connection.set_local_description(description).await?;

        let peer_connection = self.peer_connection.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let _ = gathered.recv().await;
            let Some(local) = peer_connection.local_description().await else {
                events.error("Local description missing after ICE gathering");
                return;
            };
            match into_signal(local.sdp).to_payload() {
                Ok(payload) => events.signal(payload),
                Err(e) => events.error(format!("Failed to encode description: {e}")),
            }
        });
        Ok(())
    }

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };

        if self.peer_connection.remote_description().await.is_none() {
            self.pending_candidates.lock().await.push(init);
            return Ok(());
        }
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn flush_pending_candidates(&self) -> Result<()> {
        let pending: Vec<_> = self.pending_candidates.lock().await.drain(..).collect();
        for init in pending {
            self.peer_connection.add_ice_candidate(init).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TransportPeer for WebRtcPeer {
    async fn send(&self, data: Bytes) -> Result<()> {
        let channel = self.channel.lock().await.clone();
        let Some(channel) = channel else {
            bail!("Data channel to {} is not open", self.events.peer_id());
        };
        channel.send(&data).await?;
        Ok(())
    }

    async fn signal(&self, payload: SignalPayload) -> Result<()> {
        let signal = PeerSignal::from_payload(&payload).context("Unrecognised signal payload")?;
        match signal {
            PeerSignal::Offer { sdp } => self.accept_offer(sdp).await,
            PeerSignal::Answer { sdp } => self.accept_answer(sdp).await,
            PeerSignal::Candidate { candidate } => self.add_candidate(candidate).await,
        }
    }

    async fn destroy(&self) -> Result<()> {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            bail!("Peer {} is already destroyed", self.events.peer_id());
        }
        self.connected.store(false, Ordering::SeqCst);
        self.peer_connection.close().await?;
        Ok(())
    }

    async fn add_stream(&self, stream: &MediaStream) -> Result<()> {
        Err(anyhow!("Media streams are not supported (stream {})", stream.id))
    }

    async fn remove_stream(&self, stream: &MediaStream) -> Result<()> {
        Err(anyhow!("Media streams are not supported (stream {})", stream.id))
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

fn bind_data_channel(
    dc: Arc<RTCDataChannel>,
    slot: ChannelSlot,
    connected: Arc<AtomicBool>,
    events: PeerEvents,
) {
    let open_events = events.clone();
    let open_dc = dc.clone();
    dc.on_open(Box::new(move || {
        let events = open_events.clone();
        let slot = slot.clone();
        let connected = connected.clone();
        let ready = open_dc.clone();

        Box::pin(async move {
            info!("Data channel to {} is open", events.peer_id());
            *slot.lock().await = Some(ready);
            connected.store(true, Ordering::SeqCst);
            events.connect();
        })
    }));

    let msg_events = events.clone();
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let events = msg_events.clone();
        Box::pin(async move {
            events.data(msg.data);
        })
    }));

    let close_events = events;
    dc.on_close(Box::new(move || {
        let events = close_events.clone();
        Box::pin(async move {
            events.close();
        })
    }));
}

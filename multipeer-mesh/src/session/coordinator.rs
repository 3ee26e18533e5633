use crate::config::SessionConfig;
use crate::events::{MeshEvent, PeerError};
use crate::framing::{MessageBatcher, MessageFramer};
use crate::registry::{PeerEntry, PeerRegistry};
use crate::session::role::{FullConnectLatch, RolePolicy};
use crate::session::session_command::{SessionCommand, Target};
use crate::session::session_snapshot::SessionSnapshot;
use crate::signaling::{SignalingAdapter, SignalingEvent};
use crate::transport::{PeerEvents, PeerHandle, PeerOptions, TransportEvent, TransportFactory};
use bytes::Bytes;
use futures::future::join_all;
use multipeer_core::{MediaStream, Payload, PeerId, SignalPayload};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Channel ends the coordinator owns.
pub(crate) struct CoordinatorChannels {
    pub command_rx: mpsc::Receiver<SessionCommand>,
    pub signaling_rx: mpsc::UnboundedReceiver<SignalingEvent>,
    pub events: broadcast::Sender<MeshEvent>,
    pub snapshot: watch::Sender<SessionSnapshot>,
}

/// The session actor. Every mutation of mesh state happens inside [`run`](Coordinator::run),
/// one input at a time.
pub(crate) struct Coordinator {
    policy: RolePolicy,
    config: SessionConfig,
    registry: PeerRegistry,
    signaling: SignalingAdapter,
    factory: Arc<dyn TransportFactory>,
    framer: MessageFramer,
    batcher: MessageBatcher,
    broadcasted_streams: Vec<MediaStream>,
    room: String,
    room_count: Option<usize>,
    local_id: Option<PeerId>,
    latch: FullConnectLatch,

    command_rx: mpsc::Receiver<SessionCommand>,
    signaling_rx: mpsc::UnboundedReceiver<SignalingEvent>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    /// Cloned into every transport peer's event sink.
    transport_tx: mpsc::UnboundedSender<TransportEvent>,
    events: broadcast::Sender<MeshEvent>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl Coordinator {
    pub(crate) fn new(
        policy: RolePolicy,
        config: SessionConfig,
        registry: PeerRegistry,
        signaling: SignalingAdapter,
        factory: Arc<dyn TransportFactory>,
        channels: CoordinatorChannels,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();
        let framer = MessageFramer::new(config.send_mode);
        let room_count = signaling.room_count();

        Self {
            policy,
            config,
            registry,
            signaling,
            factory,
            framer,
            batcher: MessageBatcher::new(),
            broadcasted_streams: Vec::new(),
            room: String::new(),
            room_count,
            local_id: None,
            latch: FullConnectLatch::default(),
            command_rx: channels.command_rx,
            signaling_rx: channels.signaling_rx,
            transport_rx,
            transport_tx,
            events: channels.events,
            snapshot: channels.snapshot,
        }
    }

    fn tag(&self) -> &'static str {
        self.policy.role().tag()
    }

    pub(crate) async fn run(mut self) {
        info!("[{}] Mesh session loop started", self.tag());

        let mut ticker = self.config.send_mode.tick_period().map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => {
                            if self.handle_command(c).await.is_break() {
                                break;
                            }
                        }
                        None => {
                            info!("[{}] All session handles dropped. Shutting down.", self.tag());
                            self.teardown().await;
                            break;
                        }
                    }
                }

                Some(evt) = self.signaling_rx.recv() => {
                    self.handle_signaling_event(evt).await;
                }

                Some(evt) = self.transport_rx.recv() => {
                    self.handle_transport_event(evt).await;
                }

                _ = next_tick(&mut ticker) => {
                    self.flush_batches().await;
                }
            }
        }

        info!("[{}] Mesh session loop finished", self.tag());
    }

    async fn handle_command(&mut self, cmd: SessionCommand) -> ControlFlow<()> {
        match cmd {
            SessionCommand::Join { room, password } => {
                info!("[{}] Joining room '{}'", self.tag(), room);
                self.room = room;
                self.publish_snapshot();
                self.signaling
                    .join(&self.config.app_name, &self.room, &password)
                    .await;
            }

            SessionCommand::Create {
                room,
                password,
                hidden,
            } => {
                info!("[{}] Creating room '{}' (hidden: {})", self.tag(), room, hidden);
                self.room = room;
                self.publish_snapshot();
                self.signaling
                    .create(&self.config.app_name, &self.room, &password, hidden)
                    .await;
            }

            SessionCommand::Send { target, payload } => {
                let destinations = self.resolve_send_target(target);
                self.send_to(destinations, payload).await;
            }

            SessionCommand::AddStream { target, stream } => {
                for entry in self.resolve_stream_target(target) {
                    debug!("[{}] Adding stream {} to {}", self.tag(), stream.id, entry.id);
                    if let Err(e) = entry.transport.add_stream(&stream).await {
                        warn!("[{}] Failed to add stream to {}: {:?}", self.tag(), entry.id, e);
                    }
                }
            }

            SessionCommand::RemoveStream { target, stream } => {
                for entry in self.resolve_stream_target(target) {
                    debug!("[{}] Removing stream {} from {}", self.tag(), stream.id, entry.id);
                    if let Err(e) = entry.transport.remove_stream(&stream).await {
                        warn!(
                            "[{}] Failed to remove stream from {}: {:?}",
                            self.tag(),
                            entry.id,
                            e
                        );
                    }
                }
            }

            SessionCommand::BroadcastStream(stream) => self.broadcast_stream(stream).await,

            SessionCommand::BroadcastRemoveStream(stream) => {
                self.broadcast_remove_stream(stream).await
            }

            SessionCommand::CheckFullConnect { reply } => {
                let fully_connected = self.check_full_connect();
                let _ = reply.send(fully_connected);
            }

            SessionCommand::Destroy { reply } => {
                self.teardown().await;
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn handle_signaling_event(&mut self, event: SignalingEvent) {
        match event {
            SignalingEvent::RoomCount(count) => {
                debug!("[{}] Room count: {}", self.tag(), count);
                self.room_count = Some(count);
                self.publish_snapshot();
                self.emit(MeshEvent::RoomCount(count));
                self.check_full_connect();
            }

            SignalingEvent::SocketId(id) => {
                info!("[{}] Assigned identity {}", self.tag(), id);
                self.local_id = Some(id.clone());
                self.publish_snapshot();
                self.emit(MeshEvent::SocketId(id));
            }

            SignalingEvent::Destroy(id) => {
                // Departures are broadcast to the whole room; most are for
                // peers this session never connected to.
                let before = self.registry.connected_count();
                if self.registry.remove(&id).await.is_none() {
                    return;
                }
                info!(
                    "[{}] Destroyed peer {}, peer count: {} -> {}",
                    self.tag(),
                    id,
                    before,
                    self.registry.connected_count()
                );
                self.emit(MeshEvent::Disconnect(id));
                self.check_full_connect();
            }

            SignalingEvent::Signal(id, payload) => {
                if self.is_local(&id) {
                    warn!("[{}] Ignoring signal addressed from own identity", self.tag());
                    return;
                }
                debug!("[{}] Receiving signal from {}", self.tag(), id);

                let entry = match self.registry.get(&id) {
                    Some(entry) => entry,
                    None => {
                        info!("[{}] {} is initializing with me", self.tag(), id);
                        match self.create_peer(id.clone(), false).await {
                            Some(entry) => entry,
                            None => return,
                        }
                    }
                };
                self.feed_signal(&entry, payload).await;
            }

            SignalingEvent::Initialize { host, peer_id } => {
                if !self.policy.initiates_toward_joiners() {
                    debug!("[{}] Ignoring initialize for {}", self.tag(), peer_id);
                    return;
                }
                if self.is_local(&peer_id) || self.registry.contains(&peer_id) {
                    debug!("[{}] {} already initialized", self.tag(), peer_id);
                    return;
                }
                info!("[{}] Initializing with {} (host {})", self.tag(), peer_id, host);
                self.create_peer(peer_id, true).await;
            }
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Error(id, error) => {
                let Some(entry) = self.registry.get(&id) else {
                    debug!("[{}] Error from released peer {}: {}", self.tag(), id, error);
                    return;
                };
                warn!("[{}] Transport error for {}: {}", self.tag(), id, error);
                self.emit(MeshEvent::Error {
                    peer: entry.transport,
                    peer_id: id,
                    detail: PeerError {
                        error,
                        initiator: entry.initiator,
                    },
                });
            }

            TransportEvent::Signal(id, payload) => {
                if !self.registry.contains(&id) {
                    debug!("[{}] Dropping signal from released peer {}", self.tag(), id);
                    return;
                }
                self.signaling.relay_signal(&id, payload).await;
            }

            TransportEvent::Connect(id) => {
                if !self.registry.mark_connected(&id) {
                    debug!("[{}] Ignoring connect from {}", self.tag(), id);
                    return;
                }
                info!(
                    "[{}] New peer connection {}, peer count: {}",
                    self.tag(),
                    id,
                    self.registry.connected_count()
                );
                self.emit(MeshEvent::Connect(id));
                self.check_full_connect();
            }

            TransportEvent::Data(id, data) => {
                debug!("[{}] {} bytes from {}", self.tag(), data.len(), id);
                match self.framer.decode(data) {
                    Ok(messages) => {
                        for payload in messages {
                            self.emit(MeshEvent::Data {
                                peer_id: id.clone(),
                                payload,
                            });
                        }
                    }
                    Err(e) => warn!("[{}] Dropping malformed batch from {}: {}", self.tag(), id, e),
                }
            }

            TransportEvent::Stream(id, stream) => {
                info!("[{}] Stream {} received from {}", self.tag(), stream.id, id);
                self.emit(MeshEvent::Stream { peer_id: id, stream });
            }

            TransportEvent::Track(id, track, stream) => {
                debug!("[{}] Track {} ({}) from {}", self.tag(), track.id, track.kind, id);
                self.emit(MeshEvent::Track {
                    track,
                    peer_id: id,
                    stream,
                });
            }

            TransportEvent::Close(id) => {
                info!("[{}] Peer connection closed: {}", self.tag(), id);
            }
        }
    }

    /// Create a transport peer and register it. Factory failures are logged;
    /// there is no peer handle to report them through.
    async fn create_peer(&mut self, id: PeerId, initiator: bool) -> Option<PeerEntry> {
        let options = PeerOptions {
            initiator,
            trickle: self.config.trickle,
            streams: self.broadcasted_streams.clone(),
        };
        let events = PeerEvents::new(id.clone(), self.transport_tx.clone());

        match self.factory.create(id.clone(), options, events).await {
            Ok(transport) => {
                let handle = PeerHandle::new(id.clone(), transport);
                Some(self.registry.upsert(PeerEntry::new(id, handle, initiator)))
            }
            Err(e) => {
                error!("[{}] Failed to create transport for {}: {:?}", self.tag(), id, e);
                None
            }
        }
    }

    async fn feed_signal(&mut self, entry: &PeerEntry, payload: SignalPayload) {
        if let Err(e) = entry.transport.signal(payload).await {
            warn!("[{}] Signal rejected by {}: {:?}", self.tag(), entry.id, e);
            self.emit(MeshEvent::Error {
                peer: entry.transport.clone(),
                peer_id: entry.id.clone(),
                detail: PeerError {
                    error: e.to_string(),
                    initiator: entry.initiator,
                },
            });
        }
    }

    /// Re-evaluate the role's completeness rule and announce a false -> true crossing.
    fn check_full_connect(&mut self) -> bool {
        let connected = self.registry.connected_count();
        let satisfied = self.policy.is_fully_connected(connected, self.room_count);

        let crossed = self.latch.update(satisfied);
        self.publish_snapshot();
        if crossed {
            info!(
                "[{}] Fully connected ({} peers, room count {:?})",
                self.tag(),
                connected,
                self.room_count
            );
            self.emit(MeshEvent::FullConnect);
        }
        satisfied
    }

    fn resolve_send_target(&self, target: Target) -> Vec<PeerId> {
        match target {
            Target::Peer(id) => vec![id],
            Target::Counterpart => self.registry.first_connected().map(|e| e.id).into_iter().collect(),
            Target::All => self.registry.ids(),
        }
    }

    fn resolve_stream_target(&self, target: Target) -> Vec<PeerEntry> {
        match target {
            Target::Peer(id) => self.registry.get(&id).into_iter().collect(),
            Target::Counterpart => self
                .registry
                .first_connected()
                .or_else(|| self.registry.all().into_iter().next())
                .into_iter()
                .collect(),
            Target::All => self.registry.all(),
        }
    }

    async fn send_to(&mut self, destinations: Vec<PeerId>, payload: Payload) {
        if destinations.is_empty() {
            debug!("[{}] No destination for outbound message", self.tag());
            return;
        }

        if self.framer.is_batched() {
            for destination in destinations {
                self.batcher.push(destination, payload.clone());
            }
            return;
        }

        let frame = match self.framer.encode(&payload) {
            Ok(frame) => frame,
            Err(e) => {
                error!("[{}] Failed to encode message: {}", self.tag(), e);
                return;
            }
        };
        let sends = destinations
            .into_iter()
            .filter_map(|id| self.registry.get(&id))
            .map(|entry| self.deliver(entry, frame.clone()));
        join_all(sends).await;
    }

    /// Drain the outbound queue: one frame per destination with pending messages.
    async fn flush_batches(&mut self) {
        if self.batcher.is_empty() {
            return;
        }

        let mut sends = Vec::new();
        for batch in self.batcher.drain() {
            let Some(entry) = self.registry.get(&batch.destination) else {
                continue;
            };
            match self.framer.encode_batch(&batch.payloads) {
                Ok(frame) => sends.push(self.deliver(entry, frame)),
                Err(e) => error!("[{}] Failed to encode batch: {}", self.tag(), e),
            }
        }
        join_all(sends).await;
    }

    async fn deliver(&self, entry: PeerEntry, frame: Bytes) {
        debug!("[{}] Sending {} bytes to {}", self.tag(), frame.len(), entry.id);
        if let Err(e) = entry.transport.send(frame).await {
            warn!("[{}] Failed to send to {}: {:?}", self.tag(), entry.id, e);
        }
    }

    async fn broadcast_stream(&mut self, stream: MediaStream) {
        if self.broadcasted_streams.contains(&stream) {
            warn!("[{}] Stream {} is already broadcast", self.tag(), stream.id);
            return;
        }
        self.broadcasted_streams.push(stream.clone());
        self.publish_snapshot();

        let peers = self.registry.all();
        info!("[{}] Broadcasting stream {} to {} peers", self.tag(), stream.id, peers.len());
        for entry in peers {
            if let Err(e) = entry.transport.add_stream(&stream).await {
                warn!("[{}] Failed to add stream to {}: {:?}", self.tag(), entry.id, e);
            }
        }
    }

    async fn broadcast_remove_stream(&mut self, stream: MediaStream) {
        let Some(index) = self.broadcasted_streams.iter().position(|s| *s == stream) else {
            warn!("[{}] Stream {} is not broadcast", self.tag(), stream.id);
            return;
        };
        self.broadcasted_streams.remove(index);
        self.publish_snapshot();

        let peers = self.registry.all();
        info!("[{}] Removing stream {} from {} peers", self.tag(), stream.id, peers.len());
        for entry in peers {
            if let Err(e) = entry.transport.remove_stream(&stream).await {
                warn!("[{}] Failed to remove stream from {}: {:?}", self.tag(), entry.id, e);
            }
        }
    }

    async fn teardown(&mut self) {
        info!("[{}] Destroying session with {} peers", self.tag(), self.registry.len());
        if !self.batcher.is_empty() {
            debug!("[{}] Discarding {} queued messages", self.tag(), self.batcher.len());
            self.batcher.drain();
        }
        self.signaling.destroy().await;
        self.registry.clear().await;
        self.broadcasted_streams.clear();
        self.latch.update(false);
        self.publish_snapshot();
    }

    fn is_local(&self, id: &PeerId) -> bool {
        self.local_id.as_ref() == Some(id)
    }

    fn emit(&self, event: MeshEvent) {
        // Fails only while nobody is subscribed.
        let _ = self.events.send(event);
    }

    fn publish_snapshot(&self) {
        let snapshot = SessionSnapshot {
            state: multipeer_core::SessionState {
                app_name: self.config.app_name.clone(),
                room: self.room.clone(),
                role: self.policy.role(),
            },
            room_count: self.room_count,
            local_id: self.local_id.clone(),
            fully_connected: self.latch.is_satisfied(),
            broadcasted_streams: self.broadcasted_streams.clone(),
        };
        self.snapshot.send_replace(snapshot);
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

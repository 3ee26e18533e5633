use std::time::Duration;

pub const DEFAULT_TICKS_PER_SECOND: u32 = 60;

/// How outbound messages reach the transport. Fixed for a session's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendMode {
    /// Every send is framed and handed to the transport right away.
    #[default]
    Immediate,
    /// Sends are queued and flushed once per tick as one JSON array per destination.
    Batched { ticks_per_second: u32 },
}

impl SendMode {
    pub fn batched() -> Self {
        SendMode::Batched {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
        }
    }

    pub fn is_batched(&self) -> bool {
        matches!(self, SendMode::Batched { .. })
    }

    pub(crate) fn tick_period(&self) -> Option<Duration> {
        match *self {
            SendMode::Immediate => None,
            SendMode::Batched { ticks_per_second } => Some(Duration::from_secs_f64(
                1.0 / f64::from(ticks_per_second.max(1)),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Application name; rooms are namespaced by it on the signaling service.
    pub app_name: String,
    pub send_mode: SendMode,
    /// Passed to every transport peer; trickle ICE candidates instead of waiting for gathering.
    pub trickle: bool,
    /// Ask the signaling client to skip transport fallbacks and speak websocket only.
    pub websocket_only: bool,
    /// How long a client join waits for the signaling service to report the room size.
    pub room_count_timeout: Duration,
    /// How long a client join waits for the mesh to complete once the room is known.
    pub full_connect_timeout: Duration,
    /// Capacity of the public event channel. Slow subscribers lag beyond it.
    pub event_capacity: usize,
    pub command_capacity: usize,
}

impl SessionConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    pub fn with_send_mode(mut self, send_mode: SendMode) -> Self {
        self.send_mode = send_mode;
        self
    }

    pub fn with_trickle(mut self, trickle: bool) -> Self {
        self.trickle = trickle;
        self
    }

    pub fn with_websocket_only(mut self, websocket_only: bool) -> Self {
        self.websocket_only = websocket_only;
        self
    }

    pub fn with_room_count_timeout(mut self, timeout: Duration) -> Self {
        self.room_count_timeout = timeout;
        self
    }

    pub fn with_full_connect_timeout(mut self, timeout: Duration) -> Self {
        self.full_connect_timeout = timeout;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            send_mode: SendMode::Immediate,
            trickle: true,
            websocket_only: false,
            room_count_timeout: Duration::from_secs(5),
            full_connect_timeout: Duration::from_secs(10),
            event_capacity: 256,
            command_capacity: 256,
        }
    }
}

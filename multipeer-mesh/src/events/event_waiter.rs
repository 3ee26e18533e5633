use crate::error::{MeshError, Result};
use crate::events::{EventKind, MeshEvent};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Resolves on the next occurrence of a named event, optionally bounded by a timeout.
///
/// A waiter only observes events published after it was created, so create
/// it before triggering whatever produces the event. When the timeout wins,
/// the pending wait is dropped and nothing is delivered for it afterwards.
pub struct EventWaiter {
    rx: broadcast::Receiver<MeshEvent>,
}

impl EventWaiter {
    pub fn new(rx: broadcast::Receiver<MeshEvent>) -> Self {
        Self { rx }
    }

    pub async fn wait_for(
        &mut self,
        kind: EventKind,
        timeout: Option<Duration>,
    ) -> Result<MeshEvent> {
        match timeout {
            None => self.next_of(kind).await,
            Some(limit) => tokio::time::timeout(limit, self.next_of(kind))
                .await
                .map_err(|_| MeshError::Timeout {
                    event: kind.name(),
                    timeout_ms: limit.as_millis(),
                })?,
        }
    }

    async fn next_of(&mut self, kind: EventKind) -> Result<MeshEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.kind() == kind => return Ok(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event waiter for '{}' lagged by {} events", kind, skipped);
                }
                Err(RecvError::Closed) => return Err(MeshError::SessionClosed),
            }
        }
    }
}

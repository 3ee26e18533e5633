use multipeer_core::{Payload, PeerId};
use std::collections::HashMap;

/// Everything queued for one destination during a tick, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundBatch {
    pub destination: PeerId,
    pub payloads: Vec<Payload>,
}

/// Outbound queue for batched mode. Drained once per tick.
#[derive(Debug, Default)]
pub struct MessageBatcher {
    queue: Vec<(PeerId, Payload)>,
}

impl MessageBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, destination: PeerId, payload: Payload) {
        self.queue.push((destination, payload));
    }

    /// Take the whole queue, grouped per destination. Destinations are
    /// ordered by their first queued message; each group keeps arrival order.
    pub fn drain(&mut self) -> Vec<OutboundBatch> {
        let mut batches: Vec<OutboundBatch> = Vec::new();
        let mut index: HashMap<PeerId, usize> = HashMap::new();

        for (destination, payload) in self.queue.drain(..) {
            match index.get(&destination) {
                Some(&i) => batches[i].payloads.push(payload),
                None => {
                    index.insert(destination.clone(), batches.len());
                    batches.push(OutboundBatch {
                        destination,
                        payloads: vec![payload],
                    });
                }
            }
        }

        batches
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::CombatEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Cast outcomes, committed or rejected
    Cast,
    /// Scheduler ticks, cancellations and dispels
    Periodic,
}

impl Topic {
    pub const ALL: [Topic; 2] = [Topic::Cast, Topic::Periodic];
}

struct Channels {
    cast: broadcast::Sender<CombatEvent>,
    periodic: broadcast::Sender<CombatEvent>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<CombatEvent> {
        match topic {
            Topic::Cast => &self.cast,
            Topic::Periodic => &self.periodic,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; events sent while a
/// topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Channels {
                cast: broadcast::channel(capacity).0,
                periodic: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: CombatEvent) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<CombatEvent> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<CombatEvent>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ActiveEffectId, Tick};

    #[tokio::test]
    async fn events_only_reach_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut cast_rx = bus.subscribe(Topic::Cast);
        let mut periodic_rx = bus.subscribe(Topic::Periodic);

        bus.publish(CombatEvent::EffectCancelled {
            effect: ActiveEffectId(3),
            at: Tick(500),
        });

        let received = periodic_rx.recv().await.unwrap();
        assert_eq!(received.at(), Tick(500));
        assert!(cast_rx.try_recv().is_err());
    }
}

//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tokio::sync::broadcast;

use super::types::{ActionEvent, SessionEvent, TickEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::EnumIter)]
pub enum Topic {
    /// Command outcomes (applied, failed, rejected, dropped)
    Action,
    /// Tick completion with state checksum
    Tick,
    /// Peer membership and synchronization
    Session,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Action(ActionEvent),
    Tick(TickEvent),
    Session(SessionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Action(_) => Topic::Action,
            Event::Tick(_) => Topic::Tick,
            Event::Session(_) => Topic::Session,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels for every topic exist from construction.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels[&topic].send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels[&topic].subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
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
    use game_core::{PlayerId, Tick};

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut ticks = bus.subscribe(Topic::Tick);
        let mut sessions = bus.subscribe(Topic::Session);

        bus.publish(Event::Session(SessionEvent::PeerConnected(PlayerId(1))));
        bus.publish(Event::Tick(TickEvent {
            tick: Tick(3),
            actions: 0,
            checksum: [0; 32],
        }));

        assert!(matches!(ticks.recv().await.unwrap(), Event::Tick(TickEvent { tick: Tick(3), .. })));
        assert_eq!(
            sessions.recv().await.unwrap(),
            Event::Session(SessionEvent::PeerConnected(PlayerId(1)))
        );
        assert!(ticks.try_recv().is_err());
    }
}

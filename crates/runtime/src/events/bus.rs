//! Topic-based event bus implementation.

use std::collections::HashMap;

use combat_core::CombatEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{LifecycleEvent, ScriptEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Damage, healing, statuses, movement and cast cues
    Combat,
    /// Spawns, deaths and despawns
    Lifecycle,
    /// Script call results
    Script,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Combat, Topic::Lifecycle, Topic::Script];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Combat(CombatEvent),
    Lifecycle(LifecycleEvent),
    Script(ScriptEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Combat(_) => Topic::Combat,
            Event::Lifecycle(_) => Topic::Lifecycle,
            Event::Script(_) => Topic::Script,
        }
    }
}

/// Topic-based event bus
///
/// Consumers subscribe to specific topics and only receive the events they
/// care about. Publishing never blocks; events without subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    combat: broadcast::Sender<Event>,
    lifecycle: broadcast::Sender<Event>,
    script: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            combat: broadcast::channel(capacity).0,
            lifecycle: broadcast::channel(capacity).0,
            script: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Combat => &self.combat,
            Topic::Lifecycle => &self.lifecycle,
            Topic::Script => &self.script,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!(target: "runtime::events", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
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

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("combat_subscribers", &self.combat.receiver_count())
            .field("lifecycle_subscribers", &self.lifecycle.receiver_count())
            .field("script_subscribers", &self.script.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::EntityId;

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut lifecycle = bus.subscribe(Topic::Lifecycle);
        let mut combat = bus.subscribe(Topic::Combat);

        bus.publish(Event::Lifecycle(LifecycleEvent::Despawned {
            creature: EntityId(3),
        }));

        assert_eq!(
            lifecycle.recv().await.expect("lifecycle event"),
            Event::Lifecycle(LifecycleEvent::Despawned {
                creature: EntityId(3)
            })
        );
        assert!(combat.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(Event::Script(ScriptEvent::Aborted {
            creature: EntityId(1),
            calls: 0,
        }));
        assert_eq!(bus.subscribe_multiple(&Topic::ALL).len(), 3);
    }
}

//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving monsters, using castables or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{
    Creature, EntityId, MapId, Position, TargetSelector, TickOutcome, UseOutcome, WorldState,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Advance every living monster by one step.
    ///
    /// Returns the monsters that did something other than idle.
    pub async fn tick(&self) -> Result<Vec<(EntityId, TickOutcome)>> {
        self.request(|reply| Command::Tick { reply }).await
    }

    /// Advance a single monster by one step.
    pub async fn advance(&self, id: EntityId) -> Result<TickOutcome> {
        self.request(|reply| Command::Advance { id, reply }).await?
    }

    /// Use a castable on behalf of `caster`.
    ///
    /// For scripted castables this resolves once the script's `OnUse` call
    /// has finished.
    pub async fn use_ability(
        &self,
        caster: EntityId,
        castable: impl Into<String>,
        selector: Option<TargetSelector>,
    ) -> Result<UseOutcome> {
        let castable = castable.into();
        self.request(|reply| Command::UseAbility {
            caster,
            castable,
            selector,
            reply,
        })
        .await?
    }

    /// Spawn a monster from a named template.
    pub async fn spawn_monster(
        &self,
        template: impl Into<String>,
        map: MapId,
        position: Position,
    ) -> Result<EntityId> {
        let template = template.into();
        self.request(|reply| Command::Spawn {
            template,
            map,
            position,
            reply,
        })
        .await?
    }

    /// Place an already built creature (usually a player) into the world.
    pub async fn insert_creature(&self, creature: Creature) -> Result<EntityId> {
        self.request(|reply| Command::InsertCreature {
            creature: Box::new(creature),
            reply,
        })
        .await?
    }

    /// Remove a creature without death handling. Returns false if it was absent.
    pub async fn despawn(&self, id: EntityId) -> Result<bool> {
        self.request(|reply| Command::Despawn { id, reply }).await
    }

    /// Queue death handling for `id`, for deaths caused outside the runtime.
    pub async fn notify_death(&self, id: EntityId) -> Result<()> {
        self.request(|reply| Command::NotifyDeath { id, reply }).await
    }

    /// Deliver speech to monsters within earshot, or the whole map on a shout.
    ///
    /// Returns how many monsters had a script to hear it.
    pub async fn speak(
        &self,
        speaker: EntityId,
        text: impl Into<String>,
        shout: bool,
    ) -> Result<usize> {
        let text = text.into();
        self.request(|reply| Command::Speak {
            speaker,
            text,
            shout,
            reply,
        })
        .await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Combat` - Damage, healing, statuses, movement and cast cues
    /// - `Topic::Lifecycle` - Spawns, deaths and despawns
    /// - `Topic::Script` - Script call results
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use combat_runtime::Topic;
    ///
    /// let mut deaths = handle.subscribe(Topic::Lifecycle);
    /// while let Ok(event) = deaths.recv().await {
    ///     // Hand out loot notifications
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Query the current world (read-only snapshot)
    pub async fn query_world(&self) -> Result<WorldState> {
        self.request(|reply| Command::Query { reply }).await
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}

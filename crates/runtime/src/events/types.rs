//! Event types for the non-combat topics.

use combat_core::{EntityId, MapId, Position};
use serde::{Deserialize, Serialize};

use crate::scripting::{ScriptError, ScriptValue};

/// Creatures entering and leaving the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Spawned {
        creature: EntityId,
        template: String,
        map: MapId,
        position: Position,
    },
    /// A monster died and was removed from the world.
    Died {
        creature: EntityId,
        name: String,
        killer: Option<EntityId>,
        looters: Vec<EntityId>,
        drops: Vec<EntityId>,
    },
    /// A monster with death disabled was restored to full health.
    Revived { creature: EntityId },
    /// A non-monster creature fell. It stays in the world.
    Fell { creature: EntityId },
    Despawned { creature: EntityId },
}

/// Script calls made on behalf of creatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptEvent {
    Completed {
        creature: EntityId,
        script: String,
        function: String,
        value: ScriptValue,
    },
    Failed {
        creature: EntityId,
        script: String,
        function: String,
        error: ScriptError,
    },
    /// In-flight calls were aborted because the creature left the world.
    Aborted { creature: EntityId, calls: usize },
}

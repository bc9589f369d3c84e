//! Observable outcomes of combat decisions.
//!
//! Core code never talks to clients. It appends [`CombatEvent`]s to the
//! context and the runtime forwards them to subscribers.

use crate::env::{Animation, Element};
use crate::state::{Direction, EntityId, Position};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    /// Presentation of a castable use, emitted once per successful use.
    CastCues {
        caster: EntityId,
        castable: String,
        targets: Vec<EntityId>,
        target_animation: Option<Animation>,
        spell_effect: Option<Animation>,
        sound: Option<u8>,
    },
    /// Melee swing, emitted even when nothing was hit.
    Assailed {
        attacker: EntityId,
        target: Option<EntityId>,
        animation: Animation,
        sound: u8,
    },
    Damaged {
        target: EntityId,
        attacker: Option<EntityId>,
        amount: u32,
        element: Element,
        remaining_hp: u32,
    },
    Healed {
        target: EntityId,
        healer: EntityId,
        amount: u32,
    },
    StatusApplied {
        target: EntityId,
        status: String,
        icon: u16,
    },
    StatusRemoved {
        target: EntityId,
        status: String,
        icon: u16,
    },
    StatusExpired {
        target: EntityId,
        status: String,
        icon: u16,
    },
    Moved {
        creature: EntityId,
        from: Position,
        to: Position,
    },
    Turned {
        creature: EntityId,
        direction: Direction,
    },
    /// A monster picked (or dropped) a fight target.
    TargetChanged {
        creature: EntityId,
        target: Option<EntityId>,
    },
}

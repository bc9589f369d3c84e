//! Creature combat rules shared by the runtime and offline tools.
//!
//! `combat-core` is synchronous and free of I/O. It owns the world arena, the
//! per-instance monster state and the decisions made on it: stat variance,
//! ability selection, target resolution, effect application and death
//! finalization. Randomness, content lookup and deferred control messages are
//! injected through [`RandomSource`], [`ContentOracle`] and [`ControlSink`].
pub mod ai;
pub mod combat;
pub mod config;
pub mod control;
pub mod death;
pub mod env;
pub mod error;
pub mod events;
pub mod rng;
pub mod spawn;
pub mod state;
pub mod stats;

#[cfg(test)]
mod testkit;

pub use ai::{TickOutcome, advance, execute_plan, react_to_damage};
pub use combat::{
    AggroLedger, AssailOutcome, CastPlan, CombatContext, RefusalReason, SelectionInput,
    TargetResolver, TargetSelector, UseOutcome, apply_damage, apply_heal, assail, can_cast,
    select_from, select_on_damage, select_periodic, set_casting, use_ability,
};
pub use config::CombatConfig;
pub use control::{ControlBuffer, ControlMessage, ControlSink};
pub use death::{DeathOutcome, DeathReport, handle_death};
pub use env::{
    AbilityGroup, AbilityUse, Animation, BaseStats, CastAnimations, CastTarget, Castable,
    CastableEffects, ContentOracle, ContentTables, DamageEffect, DamageRange, Element, HealEffect,
    IntentFlags, IntentScope, ItemDefinition, LootTable, NearDeathAbilities, SpawnFlags,
    SpawnTemplate, SpellUseType, StatusChanges, StatusDefinition, TargetingIntent,
};
pub use error::{CombatError, ErrorSeverity, GameError};
pub use events::CombatEvent;
pub use rng::{PcgRng, RandomSource, SequenceRng};
pub use spawn::spawn_monster;
pub use state::{
    AbilityCategory, ActiveStatus, Condition, Creature, CreatureKind, Direction, EntityId, Group,
    GroupId, ItemDropType, ItemPayload, MapId, MapState, MonsterState, PlayerState, Position,
    ResourceMeter, StatusSet, Timestamp, WorldItem, WorldState,
};
pub use stats::{CreatureStats, Variance};

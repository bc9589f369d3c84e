//! Mutable world state: creatures, their statuses, floor items and maps.
mod common;
mod creature;
mod item;
mod monster;
mod status;
mod world;

pub use common::{
    Direction, EntityId, GroupId, MapId, Position, RelativeDirection, ResourceMeter, Timestamp,
};
pub use creature::{Creature, CreatureKind, KillRecord, PlayerState};
pub use item::{ItemDropType, ItemPayload, WorldItem};
pub use monster::{AbilityBook, AbilityCategory, AbilityEntry, AbilitySlot, MonsterState};
pub use status::{ActiveStatus, Condition, StatusSet};
pub use world::{Group, MapState, WorldState};

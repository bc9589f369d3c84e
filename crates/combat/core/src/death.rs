//! Death finalization.
//!
//! Runs once per [`ControlMessage::HandleDeath`](crate::control::ControlMessage),
//! after the action that caused the death has completed.

use crate::env::{ContentOracle, LootTable};
use crate::error::GameError;
use crate::state::{
    EntityId, ItemDropType, ItemPayload, MapId, Position, Timestamp, WorldItem, WorldState,
};

/// What [`handle_death`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeathOutcome {
    /// Unknown or already dead creature.
    Ignored,
    /// Death is disabled for this monster; hit points were restored.
    Revived(EntityId),
    /// A non-monster fell. It stays in the world, marked dead.
    Fallen(EntityId),
    /// A monster was removed from the world.
    Removed(DeathReport),
}

/// Loot and credit handed out for a removed monster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeathReport {
    pub creature: EntityId,
    pub name: String,
    pub killer: Option<EntityId>,
    pub looters: Vec<EntityId>,
    /// Experience granted per looter.
    pub experience: Vec<(EntityId, u64)>,
    /// World items dropped on the corpse tile.
    pub drops: Vec<EntityId>,
}

/// Finalizes the death of `id`.
///
/// Idempotent: a second notification for the same creature is ignored.
pub fn handle_death(
    world: &mut WorldState,
    content: &dyn ContentOracle,
    now: Timestamp,
    id: EntityId,
) -> DeathOutcome {
    let Some(creature) = world.creature_mut(id) else {
        tracing::debug!(target: "combat::death", creature = %id, "already removed");
        return DeathOutcome::Ignored;
    };
    if !creature.alive {
        tracing::debug!(target: "combat::death", creature = %id, "already dead");
        return DeathOutcome::Ignored;
    }

    let death_disabled = creature.monster().is_some_and(|m| m.death_disabled());
    if death_disabled {
        creature.stats.hp.refill();
        tracing::debug!(target: "combat::death", creature = %id, "death disabled, revived");
        return DeathOutcome::Revived(id);
    }

    creature.alive = false;
    creature.casting = false;
    let Some(monster) = creature.monster_mut() else {
        tracing::info!(target: "combat::death", creature = %id, name = %creature.name, "fell");
        return DeathOutcome::Fallen(id);
    };
    let loot = monster.loot.take();
    let name = creature.name.clone();
    let killer = creature.last_hitter;
    let map = creature.map;
    let position = creature.position;

    let mut report = DeathReport {
        creature: id,
        name,
        killer,
        ..DeathReport::default()
    };

    let player_killer = killer.filter(|k| world.creature(*k).is_some_and(|c| c.is_player()));
    if let Some(killer) = player_killer {
        report.looters = looters_of(world, killer);
        credit_kill(world, &mut report, killer, loot.as_ref(), now);
        if let Some(table) = &loot {
            report.drops = drop_loot(world, content, table, &report.looters, map, position, now);
        }
    }

    world.remove_creature(id);
    tracing::info!(
        target: "combat::death",
        creature = %id,
        name = %report.name,
        killer = ?report.killer,
        looters = report.looters.len(),
        drops = report.drops.len(),
        "monster removed"
    );
    DeathOutcome::Removed(report)
}

/// The killer's group members present in the world, or the killer alone.
fn looters_of(world: &WorldState, killer: EntityId) -> Vec<EntityId> {
    let group = world.creature(killer).and_then(|c| c.group);
    let members = group.map(|g| world.group_members(g)).unwrap_or_default();
    if members.is_empty() {
        vec![killer]
    } else {
        members
    }
}

/// Tracks the kill for every looting player and shares the experience evenly.
/// The killer receives the remainder.
fn credit_kill(
    world: &mut WorldState,
    report: &mut DeathReport,
    killer: EntityId,
    loot: Option<&LootTable>,
    now: Timestamp,
) {
    let players: Vec<EntityId> = report
        .looters
        .iter()
        .copied()
        .filter(|id| world.creature(*id).is_some_and(|c| c.is_player()))
        .collect();
    let xp = loot.map_or(0, |table| table.xp);
    let count = players.len().max(1) as u64;
    let share = xp / count;
    let remainder = xp % count;

    for id in players {
        let Some(player) = world.creature_mut(id).and_then(|c| c.player_state_mut()) else {
            continue;
        };
        player.track_kill(&report.name, now);
        let amount = if id == killer { share + remainder } else { share };
        if amount > 0 {
            player.gain_experience(amount);
            report.experience.push((id, amount));
        }
    }
}

fn drop_loot(
    world: &mut WorldState,
    content: &dyn ContentOracle,
    table: &LootTable,
    looters: &[EntityId],
    map: MapId,
    position: Position,
    now: Timestamp,
) -> Vec<EntityId> {
    let mut payloads = Vec::with_capacity(table.items.len() + 1);
    for name in &table.items {
        match content.require_item(name) {
            Ok(definition) => payloads.push(ItemPayload::Item {
                name: definition.name.clone(),
            }),
            Err(err) => tracing::error!(
                target: "combat::death",
                loot_table = %table.name,
                item = %name,
                code = err.error_code(),
                "item not found, skipping"
            ),
        }
    }
    if table.gold > 0 {
        payloads.push(ItemPayload::Gold { amount: table.gold });
    }

    let mut drops = Vec::with_capacity(payloads.len());
    for payload in payloads {
        let item = WorldItem {
            id: world.allocate_id(),
            payload,
            map,
            position,
            drop_type: ItemDropType::MonsterLootPile,
            allowed_looters: looters.to_vec(),
            dropped_at: now,
        };
        match world.insert_item(item) {
            Ok(id) => drops.push(id),
            Err(err) => tracing::error!(
                target: "combat::death",
                map = ?map,
                position = %position,
                code = err.error_code(),
                "loot drop failed"
            ),
        }
    }
    drops
}

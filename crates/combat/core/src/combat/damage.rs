//! Hit point changes shared by castables and melee.

use crate::env::Element;
use crate::events::CombatEvent;
use crate::state::{EntityId, WorldState};

use super::CombatContext;

/// Removes up to `amount` hit points from `target`.
///
/// Records the attacker as last hitter. On monsters the damage also feeds the
/// aggro ledger, and a monster without a target acquires the attacker and
/// wakes up. Returns the remaining hit points, or `None` if the target does
/// not exist.
pub fn apply_damage(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    target: EntityId,
    attacker: Option<EntityId>,
    amount: u32,
    element: Element,
) -> Option<u32> {
    let creature = world.creature_mut(target)?;
    let dealt = creature.stats.hp.drain(amount);
    let remaining_hp = creature.stats.hp.current;
    if let Some(attacker) = attacker {
        creature.last_hitter = Some(attacker);
    }
    let mut acquired = None;
    if let (Some(monster), Some(attacker)) = (creature.monster_mut(), attacker) {
        if attacker != target {
            monster.aggro.record_damage(attacker, dealt);
            if monster.target.is_none() {
                monster.target = Some(attacker);
                acquired = Some(attacker);
            }
            monster.awaken();
        }
    }

    ctx.emit(CombatEvent::Damaged {
        target,
        attacker,
        amount: dealt,
        element,
        remaining_hp,
    });
    if let Some(attacker) = acquired {
        ctx.emit(CombatEvent::TargetChanged {
            creature: target,
            target: Some(attacker),
        });
    }
    Some(remaining_hp)
}

/// Restores up to `amount` hit points on `target`. Returns the amount restored.
pub fn apply_heal(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    target: EntityId,
    healer: EntityId,
    amount: u32,
) -> Option<u32> {
    let creature = world.creature_mut(target)?;
    let restored = creature.stats.hp.restore(amount);
    ctx.emit(CombatEvent::Healed {
        target,
        healer,
        amount: restored,
    });
    Some(restored)
}

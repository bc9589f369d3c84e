//! Basic melee attack ("assail").

use crate::config::CombatConfig;
use crate::control::ControlMessage;
use crate::env::Animation;
use crate::error::CombatError;
use crate::events::CombatEvent;
use crate::state::{EntityId, WorldState};

use super::{CombatContext, apply_damage};

/// Result of one swing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssailOutcome {
    pub target: Option<EntityId>,
    pub damage: u32,
    pub killed: bool,
}

/// Swings at `target`, or at whatever stands on the faced tile when `None`.
///
/// Damage is the template's melee range scaled by the attacker's variance.
/// Merchants, the attacker itself and dead creatures are never hit.
pub fn assail(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    attacker: EntityId,
    target: Option<EntityId>,
) -> Result<AssailOutcome, CombatError> {
    let creature = world.require_creature(attacker)?;
    let monster = creature.monster().ok_or(CombatError::NotAMonster(attacker))?;
    let range = monster.template.damage;
    let variance = monster.variance;
    let element = creature.stats.effective_offensive_element();
    let faced = creature.position.step(creature.direction);
    let map = creature.map;

    let victim = target
        .or_else(|| world.creature_at(map, faced))
        .filter(|id| *id != attacker)
        .filter(|id| {
            world
                .creature(*id)
                .is_some_and(|c| c.alive && !c.is_merchant())
        });

    ctx.emit(CombatEvent::Assailed {
        attacker,
        target: victim,
        animation: Animation {
            id: CombatConfig::ASSAIL_ANIMATION,
            speed: CombatConfig::ASSAIL_ANIMATION_SPEED,
        },
        sound: CombatConfig::ASSAIL_SOUND,
    });

    let Some(victim) = victim else {
        return Ok(AssailOutcome::default());
    };

    let amount = variance.scale_damage(range.min, range.max, &mut *ctx.rng);
    let remaining = apply_damage(world, ctx, victim, Some(attacker), amount, element);
    let killed = remaining == Some(0);
    if killed {
        ctx.enqueue(ControlMessage::HandleDeath(victim));
    }
    tracing::trace!(
        target: "combat::resolver",
        attacker = %attacker,
        victim = %victim,
        amount,
        killed,
        "assail"
    );
    Ok(AssailOutcome {
        target: Some(victim),
        damage: amount,
        killed,
    })
}

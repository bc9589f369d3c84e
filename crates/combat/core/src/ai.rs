//! One decision step of one monster.

use crate::combat::{
    AssailOutcome, CastPlan, CombatContext, SelectionInput, UseOutcome, assail, can_cast,
    select_on_damage, select_periodic, use_ability,
};
use crate::error::{CombatError, GameError};
use crate::events::CombatEvent;
use crate::state::{Direction, EntityId, Position, WorldState};

/// What a monster did during [`advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do, or not allowed to act yet.
    Idle,
    Wandered(Position),
    Approached(Position),
    /// Wanted to move but every step was blocked.
    Blocked,
    Turned(Direction),
    Assailed(AssailOutcome),
    Cast(UseOutcome),
    /// The defensive branch was chosen.
    Deferred,
}

/// Advances monster `id` by one step.
///
/// Dead, missing and AI-disabled monsters idle. Otherwise the monster picks a
/// target, closes in, turns to face it and then attacks or casts.
pub fn advance(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    id: EntityId,
) -> Result<TickOutcome, CombatError> {
    let now = ctx.now;
    let Some(creature) = world.creature_mut(id) else {
        return Ok(TickOutcome::Idle);
    };
    if !creature.alive {
        return Ok(TickOutcome::Idle);
    }
    let monster = creature.monster().ok_or(CombatError::NotAMonster(id))?;
    if monster.ai_disabled() || !monster.can_act(now, ctx.config.action_delay_ms) {
        return Ok(TickOutcome::Idle);
    }

    for expired in creature.statuses.remove_expired(now) {
        ctx.emit(CombatEvent::StatusExpired {
            target: id,
            status: expired.name,
            icon: expired.icon,
        });
    }

    let target = choose_target(world, id, ctx.config.aggro_radius);
    retarget(world, ctx, id, target);

    let Some(target) = target else {
        return wander(world, ctx, id);
    };
    let (here, facing, target_at) = {
        let creature = world.require_creature(id)?;
        let target_at = world.require_creature(target)?.position;
        (creature.position, creature.direction, target_at)
    };

    let Some(toward) = here.direction_to_adjacent(target_at) else {
        return approach(world, ctx, id, target_at);
    };
    if toward != facing {
        turn(world, ctx, id, toward);
        return Ok(TickOutcome::Turned(toward));
    }

    stamp_action(world, ctx, id);
    let monster_can_cast = world
        .require_creature(id)?
        .monster()
        .is_some_and(can_cast);
    if !monster_can_cast {
        return assail(world, ctx, id, Some(target)).map(TickOutcome::Assailed);
    }

    let input = SelectionInput::gather(world, id, Some(target))?;
    let monster = world
        .require_creature_mut(id)?
        .monster_mut()
        .ok_or(CombatError::NotAMonster(id))?;
    let plan = select_periodic(monster, &input, &mut *ctx.rng, now)?;
    execute_plan(world, ctx, id, plan, Some(target))
}

/// Carries out a selected plan. Melee swings at `fallback`.
pub fn execute_plan(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    id: EntityId,
    plan: CastPlan,
    fallback: Option<EntityId>,
) -> Result<TickOutcome, CombatError> {
    match plan {
        CastPlan::Cast {
            ability, target, ..
        } => use_ability(world, ctx, id, &ability.name, Some(&ability), target)
            .map(TickOutcome::Cast),
        CastPlan::Melee => assail(world, ctx, id, fallback).map(TickOutcome::Assailed),
        CastPlan::Deferred => Ok(TickOutcome::Deferred),
    }
}

/// Runs the reactive cycle for monsters damaged by events emitted since `mark`.
///
/// Each damaged monster reacts once, against its first attacker. Damage caused
/// by the reactions themselves is not reacted to.
pub fn react_to_damage(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    mark: usize,
) -> Vec<(EntityId, TickOutcome)> {
    let mut hits: Vec<(EntityId, EntityId)> = Vec::new();
    for event in ctx.events_since(mark) {
        if let CombatEvent::Damaged {
            target,
            attacker: Some(attacker),
            ..
        } = event
        {
            if target != attacker && !hits.iter().any(|(t, _)| t == target) {
                hits.push((*target, *attacker));
            }
        }
    }

    let mut reactions = Vec::new();
    for (id, attacker) in hits {
        match react(world, ctx, id, attacker) {
            Ok(Some(outcome)) => reactions.push((id, outcome)),
            Ok(None) => {}
            Err(err) => tracing::warn!(
                target: "combat::resolver",
                creature = %id,
                attacker = %attacker,
                code = err.error_code(),
                error = %err,
                "damage reaction failed"
            ),
        }
    }
    reactions
}

fn react(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    id: EntityId,
    attacker: EntityId,
) -> Result<Option<TickOutcome>, CombatError> {
    let reacts = world
        .creature(id)
        .filter(|c| c.alive)
        .and_then(|c| c.monster())
        .is_some_and(|m| !m.ai_disabled());
    if !reacts {
        return Ok(None);
    }
    let input = SelectionInput::gather(world, id, Some(attacker))?;
    let monster = world
        .require_creature_mut(id)?
        .monster_mut()
        .ok_or(CombatError::NotAMonster(id))?;
    let Some(plan) = select_on_damage(monster, &input, &mut *ctx.rng, ctx.now)? else {
        return Ok(None);
    };
    // Melee only reaches the faced tile.
    if plan == CastPlan::Melee && !faces(world, id, attacker) {
        return Ok(None);
    }
    execute_plan(world, ctx, id, plan, Some(attacker)).map(Some)
}

fn faces(world: &WorldState, id: EntityId, other: EntityId) -> bool {
    let (Some(creature), Some(other)) = (world.creature(id), world.creature(other)) else {
        return false;
    };
    creature.map == other.map && creature.position.step(creature.direction) == other.position
}

/// Current target if still valid, else the top attacker, else (when hostile)
/// the nearest living player within `radius`.
fn choose_target(world: &WorldState, id: EntityId, radius: u32) -> Option<EntityId> {
    let creature = world.creature(id)?;
    let monster = creature.monster()?;
    let valid = |target: &EntityId| {
        *target != id
            && world
                .creature(*target)
                .is_some_and(|c| c.alive && c.map == creature.map && !c.is_merchant())
    };

    monster
        .target
        .filter(valid)
        .or_else(|| monster.aggro.top_attacker().filter(valid))
        .or_else(|| {
            if !monster.hostile {
                return None;
            }
            world
                .creatures_on_map(creature.map)
                .into_iter()
                .filter_map(|other| world.creature(other))
                .filter(|c| c.is_player() && c.alive)
                .map(|c| (creature.position.chebyshev(c.position), c.id))
                .filter(|(distance, _)| *distance <= radius)
                .min()
                .map(|(_, other)| other)
        })
}

fn retarget(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    id: EntityId,
    target: Option<EntityId>,
) {
    let Some(monster) = world.creature_mut(id).and_then(|c| c.monster_mut()) else {
        return;
    };
    let changed = monster.target != target;
    match target {
        Some(target) => {
            monster.target = Some(target);
            monster.awaken();
        }
        None => monster.sleep(),
    }
    if changed {
        ctx.emit(CombatEvent::TargetChanged {
            creature: id,
            target,
        });
    }
}

/// Random single step for wandering monsters.
fn wander(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    id: EntityId,
) -> Result<TickOutcome, CombatError> {
    let creature = world.require_creature(id)?;
    let wanders = creature.movement_allowed()
        && creature
            .monster()
            .is_some_and(|m| m.should_wander && !m.movement_disabled());
    if !wanders {
        return Ok(TickOutcome::Idle);
    }
    let index = ctx.rng.next_int(Direction::ALL.len() as u32) as usize;
    let direction = Direction::ALL
        .get(index)
        .copied()
        .unwrap_or_default();
    match step(world, ctx, id, direction)? {
        Some(to) => Ok(TickOutcome::Wandered(to)),
        None => Ok(TickOutcome::Idle),
    }
}

/// Single step toward `goal` along the longer axis, falling back to the other.
fn approach(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    id: EntityId,
    goal: Position,
) -> Result<TickOutcome, CombatError> {
    let creature = world.require_creature(id)?;
    let movable = creature.movement_allowed()
        && creature.monster().is_some_and(|m| !m.movement_disabled());
    if !movable {
        return Ok(TickOutcome::Idle);
    }

    let here = creature.position;
    let dx = goal.x - here.x;
    let dy = goal.y - here.y;
    let horizontal = match dx.signum() {
        1 => Some(Direction::East),
        -1 => Some(Direction::West),
        _ => None,
    };
    let vertical = match dy.signum() {
        1 => Some(Direction::South),
        -1 => Some(Direction::North),
        _ => None,
    };
    let candidates = if dx.abs() >= dy.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };

    for direction in candidates.into_iter().flatten() {
        if let Some(to) = step(world, ctx, id, direction)? {
            return Ok(TickOutcome::Approached(to));
        }
    }
    Ok(TickOutcome::Blocked)
}

/// Moves one tile in `direction`, facing it. `None` when blocked.
fn step(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    id: EntityId,
    direction: Direction,
) -> Result<Option<Position>, CombatError> {
    let from = world.require_creature(id)?.position;
    let to = from.step(direction);
    if !world.move_creature(id, to)? {
        return Ok(None);
    }
    if let Some(creature) = world.creature_mut(id) {
        creature.direction = direction;
    }
    stamp_action(world, ctx, id);
    ctx.emit(CombatEvent::Moved {
        creature: id,
        from,
        to,
    });
    Ok(Some(to))
}

fn turn(world: &mut WorldState, ctx: &mut CombatContext<'_>, id: EntityId, direction: Direction) {
    if let Some(creature) = world.creature_mut(id) {
        creature.direction = direction;
    }
    stamp_action(world, ctx, id);
    ctx.emit(CombatEvent::Turned {
        creature: id,
        direction,
    });
}

fn stamp_action(world: &mut WorldState, ctx: &CombatContext<'_>, id: EntityId) {
    if let Some(monster) = world.creature_mut(id).and_then(|c| c.monster_mut()) {
        monster.last_action = Some(ctx.now);
    }
}

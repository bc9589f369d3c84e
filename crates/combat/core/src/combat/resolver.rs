//! Applies one castable use to the world.
//!
//! Order of work for a use:
//!
//! 1. casting must be allowed by the caster's conditions;
//! 2. targets are resolved; none (and not an assail) refuses the use;
//! 3. presentation cues are emitted once;
//! 4. a scripted castable is handed back to the caller to run its script;
//! 5. otherwise every target takes damage or healing (never both) and the
//!    status changes;
//! 6. creatures brought to zero hit points are queued for death handling.

use crate::control::ControlMessage;
use crate::env::{AbilityUse, Castable};
use crate::error::{CombatError, GameError};
use crate::events::CombatEvent;
use crate::state::{ActiveStatus, EntityId, WorldState};

use super::{CombatContext, TargetResolver, TargetSelector, apply_damage, apply_heal};

/// Why a use did not happen. Not an error: the caller may simply retry later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefusalReason {
    /// A status condition (frozen, asleep, ...) forbids casting.
    CastingForbidden,
    NoTargets,
}

/// Result of [`use_ability`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UseOutcome {
    /// Built-in effects were applied.
    Applied {
        targets: Vec<EntityId>,
        /// Targets left at zero hit points, already queued for death handling.
        dead: Vec<EntityId>,
    },
    /// The castable is owned by a script; the caller must run its `OnUse`.
    ///
    /// The caster's casting flag stays set until the caller clears it.
    Scripted {
        script: String,
        targets: Vec<EntityId>,
    },
    Refused(RefusalReason),
}

impl UseOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, UseOutcome::Refused(_))
    }

    pub fn targets(&self) -> &[EntityId] {
        match self {
            UseOutcome::Applied { targets, .. } | UseOutcome::Scripted { targets, .. } => targets,
            UseOutcome::Refused(_) => &[],
        }
    }
}

/// Uses the castable named `castable_name` as `caster`.
///
/// `ability` carries per-use parameters when the use comes from a monster's
/// ability list; its damage bounds override the castable's.
pub fn use_ability(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    caster: EntityId,
    castable_name: &str,
    ability: Option<&AbilityUse>,
    selector: Option<TargetSelector>,
) -> Result<UseOutcome, CombatError> {
    let content = ctx.content;
    let castable = content.require_castable(castable_name).inspect_err(|err| {
        tracing::error!(
            target: "combat::resolver",
            caster = %caster,
            castable = castable_name,
            code = err.error_code(),
            "castable not found"
        );
    })?;

    let creature = world.require_creature_mut(caster)?;
    if !creature.casting_allowed() {
        tracing::debug!(
            target: "combat::resolver",
            caster = %caster,
            castable = castable_name,
            conditions = ?creature.conditions(),
            "casting forbidden"
        );
        return Ok(UseOutcome::Refused(RefusalReason::CastingForbidden));
    }
    creature.casting = true;

    let targets = TargetResolver::new(world).resolve_selector(caster, castable, selector);
    if targets.is_empty() && !castable.is_assail {
        set_casting(world, caster, false);
        tracing::debug!(
            target: "combat::resolver",
            caster = %caster,
            castable = castable_name,
            "no targets"
        );
        return Ok(UseOutcome::Refused(RefusalReason::NoTargets));
    }

    ctx.emit(CombatEvent::CastCues {
        caster,
        castable: castable.name.clone(),
        targets: targets.clone(),
        target_animation: castable.effects.animations.on_target,
        spell_effect: castable.effects.animations.spell_effect,
        sound: castable.effects.sound,
    });

    if let Some(script) = &castable.script {
        tracing::debug!(
            target: "combat::resolver",
            caster = %caster,
            castable = castable_name,
            script = %script,
            "delegating to script"
        );
        return Ok(UseOutcome::Scripted {
            script: script.clone(),
            targets,
        });
    }

    let outcome = apply_effects(world, ctx, caster, castable, ability, targets);
    set_casting(world, caster, false);
    Ok(outcome)
}

fn apply_effects(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    caster: EntityId,
    castable: &Castable,
    ability: Option<&AbilityUse>,
    targets: Vec<EntityId>,
) -> UseOutcome {
    if castable.effects.script_override {
        return UseOutcome::Applied {
            targets,
            dead: Vec::new(),
        };
    }

    let element = match world.creature(caster) {
        Some(creature) => creature
            .stats
            .resolve_attack_element(castable.element, &mut *ctx.rng),
        None => castable.element,
    };
    let damage = castable.effects.damage();
    let heal = castable.effects.heal();

    let mut dead = Vec::new();
    for &target in &targets {
        if let Some(effect) = damage {
            let (min, max) = ability
                .and_then(AbilityUse::damage_override)
                .unwrap_or((effect.min, effect.max));
            let amount = ctx.rng.range_inclusive(min, max);
            let remaining = apply_damage(world, ctx, target, Some(caster), amount, element);
            if remaining == Some(0) && !dead.contains(&target) {
                dead.push(target);
            }
        } else if let Some(effect) = heal {
            let amount = ctx.rng.range_inclusive(effect.min, effect.max);
            apply_heal(world, ctx, target, caster, amount);
        }

        for name in &castable.effects.statuses.add {
            add_status(world, ctx, target, name, castable);
        }
        for name in &castable.effects.statuses.remove {
            remove_status(world, ctx, target, name);
        }
    }

    for id in &dead {
        ctx.enqueue(ControlMessage::HandleDeath(*id));
    }
    tracing::debug!(
        target: "combat::resolver",
        caster = %caster,
        castable = %castable.name,
        targets = targets.len(),
        dead = dead.len(),
        "castable applied"
    );
    UseOutcome::Applied { targets, dead }
}

fn add_status(
    world: &mut WorldState,
    ctx: &mut CombatContext<'_>,
    target: EntityId,
    name: &str,
    castable: &Castable,
) {
    let content = ctx.content;
    let definition = match content.require_status(name) {
        Ok(definition) => definition,
        Err(err) => {
            tracing::error!(
                target: "combat::resolver",
                castable = %castable.name,
                status = name,
                code = err.error_code(),
                "status not found, skipping"
            );
            return;
        }
    };
    let Some(creature) = world.creature_mut(target) else {
        return;
    };
    let status = ActiveStatus::from_definition(definition, ctx.now, Some(&castable.name));
    if creature.statuses.add(status) {
        ctx.emit(CombatEvent::StatusApplied {
            target,
            status: definition.name.clone(),
            icon: definition.icon,
        });
    } else {
        tracing::warn!(
            target: "combat::resolver",
            target_id = %target,
            status = name,
            "status set full"
        );
    }
}

fn remove_status(world: &mut WorldState, ctx: &mut CombatContext<'_>, target: EntityId, name: &str) {
    let content = ctx.content;
    let definition = match content.require_status(name) {
        Ok(definition) => definition,
        Err(err) => {
            tracing::error!(
                target: "combat::resolver",
                status = name,
                code = err.error_code(),
                "status not found, skipping"
            );
            return;
        }
    };
    let Some(creature) = world.creature_mut(target) else {
        return;
    };
    if let Some(removed) = creature.statuses.remove(definition.icon) {
        ctx.emit(CombatEvent::StatusRemoved {
            target,
            status: removed.name,
            icon: removed.icon,
        });
    }
}

/// Sets or clears the in-progress casting flag.
pub fn set_casting(world: &mut WorldState, caster: EntityId, casting: bool) {
    if let Some(creature) = world.creature_mut(caster) {
        creature.casting = casting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{IntentFlags, StatusDefinition, TargetingIntent};
    use crate::state::{ActiveStatus, Condition, Timestamp};
    use crate::testkit::Harness;

    fn bolt() -> Castable {
        Castable::new("bolt")
            .with_intent(TargetingIntent::targeted().with_flags(IntentFlags::FRIENDLY))
    }

    #[test]
    fn damage_excludes_healing_on_the_same_use() {
        let mut h = Harness::new();
        h.content.insert_castable(bolt().with_damage(10, 10).with_heal(50, 50));
        let caster = h.spawn_plain_monster(1, 1);
        let hero = h.add_player(1, 2, 100);

        let outcome = h
            .use_ability(caster, "bolt", None, Some(TargetSelector::Single(hero)))
            .expect("use");
        assert_eq!(
            outcome,
            UseOutcome::Applied {
                targets: vec![hero],
                dead: vec![]
            }
        );
        assert_eq!(h.hp(hero), 90);
        assert!(!h.events.iter().any(|e| matches!(e, CombatEvent::Healed { .. })));
    }

    #[test]
    fn heal_only_castable_restores_health() {
        let mut h = Harness::new();
        h.content.insert_castable(bolt().with_heal(30, 30));
        let caster = h.spawn_plain_monster(1, 1);
        let hero = h.add_player(1, 2, 100);
        if let Some(c) = h.world.creature_mut(hero) {
            c.stats.hp.current = 50;
        }
        h.use_ability(caster, "bolt", None, Some(TargetSelector::Single(hero)))
            .expect("use");
        assert_eq!(h.hp(hero), 80);
    }

    #[test]
    fn per_use_bounds_override_castable_damage() {
        let mut h = Harness::new();
        h.content.insert_castable(bolt().with_damage(40, 40));
        let caster = h.spawn_plain_monster(1, 1);
        let hero = h.add_player(1, 2, 100);
        let ability = AbilityUse::new("bolt").with_damage(3, 3);
        h.use_ability(caster, "bolt", Some(&ability), Some(TargetSelector::Single(hero)))
            .expect("use");
        assert_eq!(h.hp(hero), 97);
    }

    #[test]
    fn missing_status_is_skipped_and_others_apply() {
        let mut h = Harness::new();
        h.content
            .insert_status(StatusDefinition::new("poison", 4, 30).with_conditions(Condition::POISONED));
        h.content.insert_castable(
            bolt()
                .with_added_status("ghost")
                .with_added_status("poison"),
        );
        let caster = h.spawn_plain_monster(1, 1);
        let hero = h.add_player(1, 2, 100);

        let outcome = h
            .use_ability(caster, "bolt", None, Some(TargetSelector::Single(hero)))
            .expect("use");
        assert!(outcome.is_success());
        let statuses = &h.world.creature(hero).expect("hero").statuses;
        assert_eq!(statuses.len(), 1);
        assert!(statuses.contains(4));
    }

    #[test]
    fn undefined_status_leaves_status_set_unchanged() {
        let mut h = Harness::new();
        h.content.insert_castable(bolt().with_added_status("ghost"));
        let caster = h.spawn_plain_monster(1, 1);
        let hero = h.add_player(1, 2, 100);
        h.use_ability(caster, "bolt", None, Some(TargetSelector::Single(hero)))
            .expect("use");
        assert!(h.world.creature(hero).expect("hero").statuses.is_empty());
    }

    #[test]
    fn status_removal_by_name() {
        let mut h = Harness::new();
        let def = StatusDefinition::new("sleep", 2, 60).with_conditions(Condition::ASLEEP);
        h.content.insert_status(def.clone());
        h.content.insert_castable(bolt().with_removed_status("sleep"));
        let caster = h.spawn_plain_monster(1, 1);
        let hero = h.add_player(1, 2, 100);
        if let Some(c) = h.world.creature_mut(hero) {
            c.statuses
                .add(ActiveStatus::from_definition(&def, Timestamp::ZERO, None));
        }
        h.use_ability(caster, "bolt", None, Some(TargetSelector::Single(hero)))
            .expect("use");
        assert!(h.world.creature(hero).expect("hero").statuses.is_empty());
        assert!(h.events.iter().any(|e| matches!(
            e,
            CombatEvent::StatusRemoved { icon: 2, .. }
        )));
    }

    #[test]
    fn frozen_caster_is_refused() {
        let mut h = Harness::new();
        h.content.insert_castable(bolt().with_damage(5, 5));
        let caster = h.spawn_plain_monster(1, 1);
        let hero = h.add_player(1, 2, 100);
        let frost = StatusDefinition::new("frost", 9, 10).with_conditions(Condition::FROZEN);
        if let Some(c) = h.world.creature_mut(caster) {
            c.statuses
                .add(ActiveStatus::from_definition(&frost, Timestamp::ZERO, None));
        }

        let outcome = h
            .use_ability(caster, "bolt", None, Some(TargetSelector::Single(hero)))
            .expect("use");
        assert_eq!(outcome, UseOutcome::Refused(RefusalReason::CastingForbidden));
        assert!(!outcome.is_success());
        assert_eq!(h.hp(hero), 100);
        assert!(h.events.is_empty());
    }

    #[test]
    fn no_targets_refuses_unless_assail() {
        let mut h = Harness::new();
        h.content.insert_castable(bolt().with_damage(5, 5));
        h.content
            .insert_castable(Castable::new("swipe").assail().with_damage(5, 5));
        let caster = h.spawn_plain_monster(1, 1);

        let outcome = h.use_ability(caster, "bolt", None, None).expect("use");
        assert_eq!(outcome, UseOutcome::Refused(RefusalReason::NoTargets));
        assert!(!h.world.creature(caster).expect("caster").casting);
        assert!(h.events.is_empty());

        let outcome = h.use_ability(caster, "swipe", None, None).expect("use");
        assert!(outcome.is_success());
        assert_eq!(
            h.events
                .iter()
                .filter(|e| matches!(e, CombatEvent::CastCues { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn lethal_damage_queues_one_death_per_target() {
        let mut h = Harness::new();
        h.content.insert_castable(
            Castable::new("nova")
                .with_intent(
                    TargetingIntent::untargeted()
                        .with_square(5)
                        .with_flags(IntentFlags::FRIENDLY),
                )
                .with_damage(500, 500),
        );
        let caster = h.spawn_plain_monster(4, 4);
        let a = h.add_player(4, 5, 100);
        let b = h.add_player(5, 4, 100);

        let outcome = h.use_ability(caster, "nova", None, None).expect("use");
        assert_eq!(
            outcome,
            UseOutcome::Applied {
                targets: vec![b, a],
                dead: vec![b, a]
            }
        );
        assert_eq!(
            h.control.drain(),
            vec![ControlMessage::HandleDeath(b), ControlMessage::HandleDeath(a)]
        );
        let cues = h
            .events
            .iter()
            .filter(|e| matches!(e, CombatEvent::CastCues { .. }))
            .count();
        assert_eq!(cues, 1);
    }

    #[test]
    fn scripted_castable_is_delegated() {
        let mut h = Harness::new();
        h.content
            .insert_castable(bolt().with_damage(10, 10).with_script("fireworks"));
        let caster = h.spawn_plain_monster(1, 1);
        let hero = h.add_player(1, 2, 100);

        let outcome = h
            .use_ability(caster, "bolt", None, Some(TargetSelector::Single(hero)))
            .expect("use");
        assert_eq!(
            outcome,
            UseOutcome::Scripted {
                script: "fireworks".into(),
                targets: vec![hero]
            }
        );
        assert_eq!(h.hp(hero), 100);
        assert!(h.world.creature(caster).expect("caster").casting);
    }

    #[test]
    fn unknown_castable_is_a_configuration_gap() {
        let mut h = Harness::new();
        let caster = h.spawn_plain_monster(1, 1);
        assert_eq!(
            h.use_ability(caster, "nothing", None, None),
            Err(CombatError::AbilityNotFound("nothing".into()))
        );
    }

    #[test]
    fn damage_to_monster_feeds_aggro_and_target() {
        let mut h = Harness::new();
        h.content.insert_castable(
            Castable::new("arrow")
                .with_intent(TargetingIntent::targeted().with_flags(IntentFlags::HOSTILE))
                .with_damage(7, 7),
        );
        let hero = h.add_player(1, 2, 100);
        let monster = h.spawn_plain_monster(1, 1);

        h.use_ability(hero, "arrow", None, Some(TargetSelector::Single(monster)))
            .expect("use");
        let state = h
            .world
            .creature(monster)
            .and_then(|c| c.monster())
            .expect("monster");
        assert_eq!(state.aggro.share_of(hero), 7);
        assert_eq!(state.target, Some(hero));
        assert!(!state.idle);
    }
}

//! Castable selection: which ability a monster tries next, if any.
//!
//! Two cycles feed the selector:
//!
//! - the periodic cycle, run when a monster is adjacent to and facing its
//!   target: near-death abilities once when health first drops to the
//!   threshold, otherwise a coin flip between offense and defense;
//! - the reactive cycle, run when the monster takes damage: on-death
//!   abilities while health is below full.
//!
//! A chosen ability whose cooldown has not elapsed degrades to a melee swing
//! and leaves the cooldown untouched.

use crate::error::CombatError;
use crate::rng::RandomSource;
use crate::env::{AbilityUse, CastTarget};
use crate::state::{
    AbilityCategory, AbilitySlot, EntityId, GroupId, MonsterState, Timestamp, WorldState,
};

use super::TargetSelector;

/// What the monster should do this step.
#[derive(Clone, Debug, PartialEq)]
pub enum CastPlan {
    Cast {
        slot: AbilitySlot,
        ability: AbilityUse,
        target: Option<TargetSelector>,
    },
    /// Fall back to a basic melee attack.
    Melee,
    /// Defensive branch: reserved, does nothing.
    Deferred,
}

/// World facts the selector needs about one decision.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionInput {
    pub caster: EntityId,
    /// `hp / max_hp` of the caster.
    pub health_fraction: f64,
    /// Creature the monster retaliates against.
    pub aggressor: Option<EntityId>,
    /// The aggressor's group and its members present in the world.
    pub aggressor_group: Option<(GroupId, Vec<EntityId>)>,
}

impl SelectionInput {
    /// Collects the inputs for `caster` aimed at `aggressor`.
    pub fn gather(
        world: &WorldState,
        caster: EntityId,
        aggressor: Option<EntityId>,
    ) -> Result<Self, CombatError> {
        let creature = world.require_creature(caster)?;
        let aggressor_group = aggressor
            .and_then(|id| world.creature(id))
            .and_then(|c| c.group)
            .map(|group| (group, world.group_members(group)));
        Ok(Self {
            caster,
            health_fraction: creature.health_fraction(),
            aggressor,
            aggressor_group,
        })
    }
}

/// True if any of the four ability lists is non-empty.
pub fn can_cast(monster: &MonsterState) -> bool {
    [
        AbilityCategory::Offense,
        AbilityCategory::Defense,
        AbilityCategory::OnDeath,
        AbilityCategory::NearDeath,
    ]
    .into_iter()
    .any(|category| !monster.abilities.category(category).is_empty())
}

/// Periodic cycle.
pub fn select_periodic(
    monster: &mut MonsterState,
    input: &SelectionInput,
    rng: &mut dyn RandomSource,
    now: Timestamp,
) -> Result<CastPlan, CombatError> {
    let near_death = monster.abilities.category(AbilityCategory::NearDeath);
    if !near_death.is_empty()
        && !monster.has_cast_near_death
        && input.health_fraction * 100.0 <= monster.abilities.near_death_percent()
    {
        // One shot: the flag is set even if the cast ends up degraded to melee.
        monster.has_cast_near_death = true;
        return select_from(monster, AbilityCategory::NearDeath, input, rng, now);
    }

    if rng.coin_flip() {
        if monster.abilities.category(AbilityCategory::Offense).is_empty() {
            return Ok(CastPlan::Melee);
        }
        select_from(monster, AbilityCategory::Offense, input, rng, now)
    } else {
        Ok(CastPlan::Deferred)
    }
}

/// Reactive cycle. `None` when the on-death category does not apply.
pub fn select_on_damage(
    monster: &mut MonsterState,
    input: &SelectionInput,
    rng: &mut dyn RandomSource,
    now: Timestamp,
) -> Result<Option<CastPlan>, CombatError> {
    if monster.abilities.category(AbilityCategory::OnDeath).is_empty()
        || input.health_fraction >= 1.0
    {
        return Ok(None);
    }
    select_from(monster, AbilityCategory::OnDeath, input, rng, now).map(Some)
}

/// Picks one ability of `category` uniformly and applies the cooldown gate.
///
/// Stamps the ability's cooldown when a cast is planned.
pub fn select_from(
    monster: &mut MonsterState,
    category: AbilityCategory,
    input: &SelectionInput,
    rng: &mut dyn RandomSource,
    now: Timestamp,
) -> Result<CastPlan, CombatError> {
    let entries = monster.abilities.category(category);
    let index = rng
        .choose_index(entries.len())
        .ok_or(CombatError::EmptyAbilityCategory(category))?;
    let slot = AbilitySlot { category, index };
    let Some(entry) = monster.abilities.entry(slot) else {
        return Err(CombatError::EmptyAbilityCategory(category));
    };
    if !entry.is_ready(now) {
        return Ok(CastPlan::Melee);
    }
    let ability = entry.ability.clone();

    let target = match ability.target {
        CastTarget::Attacker => match input.aggressor {
            Some(aggressor) => Some(TargetSelector::Single(aggressor)),
            None => return Ok(CastPlan::Melee),
        },
        CastTarget::Group => match (&input.aggressor_group, input.aggressor) {
            (Some((group, _)), _) => Some(TargetSelector::Group(*group)),
            (None, Some(aggressor)) => Some(TargetSelector::Single(aggressor)),
            (None, None) => return Ok(CastPlan::Melee),
        },
        CastTarget::Random => {
            let members = match (&input.aggressor_group, input.aggressor) {
                (Some((_, members)), _) if !members.is_empty() => members.clone(),
                (_, Some(aggressor)) => vec![aggressor],
                _ => return Ok(CastPlan::Melee),
            };
            rng.choose_index(members.len())
                .and_then(|i| members.get(i).copied())
                .map(TargetSelector::Single)
        }
        CastTarget::Caster => Some(TargetSelector::Single(input.caster)),
        CastTarget::None => None,
    };

    monster.abilities.stamp(slot, now);
    Ok(CastPlan::Cast {
        slot,
        ability,
        target,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::SpawnTemplate;
    use crate::rng::SequenceRng;
    use crate::stats::Variance;

    fn monster(template: SpawnTemplate) -> MonsterState {
        MonsterState::new(Arc::new(template), Variance::NEUTRAL)
    }

    fn input(health_fraction: f64) -> SelectionInput {
        SelectionInput {
            caster: EntityId(1),
            health_fraction,
            aggressor: Some(EntityId(2)),
            aggressor_group: None,
        }
    }

    #[test]
    fn can_cast_requires_any_ability() {
        assert!(!can_cast(&monster(SpawnTemplate::builder("rat").build())));
        assert!(can_cast(&monster(
            SpawnTemplate::builder("mage")
                .defense(AbilityUse::new("ward"))
                .build()
        )));
    }

    #[test]
    fn cooldown_blocks_recast_within_interval() {
        let mut m = monster(
            SpawnTemplate::builder("mage")
                .offense(AbilityUse::new("bolt").with_interval(10))
                .build(),
        );
        // coin flip -> offense, index 0
        let mut rng = SequenceRng::new().with_ints([0, 0, 0, 0, 0, 0]);

        let first = select_periodic(&mut m, &input(1.0), &mut rng, Timestamp::from_secs(100));
        assert!(matches!(first, Ok(CastPlan::Cast { .. })));

        for secs in [100, 105, 109] {
            let plan = select_periodic(&mut m, &input(1.0), &mut rng, Timestamp::from_secs(secs));
            assert_eq!(plan, Ok(CastPlan::Melee), "recast at {secs}s");
        }

        let again = select_periodic(&mut m, &input(1.0), &mut rng, Timestamp::from_secs(110));
        assert!(matches!(again, Ok(CastPlan::Cast { .. })));
    }

    #[test]
    fn melee_fallback_leaves_cooldown_untouched() {
        let mut m = monster(
            SpawnTemplate::builder("mage")
                .offense(AbilityUse::new("bolt").with_interval(10))
                .build(),
        );
        let mut rng = SequenceRng::new();
        let now = Timestamp::from_secs(50);
        select_from(&mut m, AbilityCategory::Offense, &input(1.0), &mut rng, now).expect("cast");
        select_from(
            &mut m,
            AbilityCategory::Offense,
            &input(1.0),
            &mut rng,
            Timestamp::from_secs(55),
        )
        .expect("melee");
        let slot = AbilitySlot {
            category: AbilityCategory::Offense,
            index: 0,
        };
        assert_eq!(m.abilities.entry(slot).and_then(|e| e.last_cast), Some(now));
    }

    #[test]
    fn near_death_fires_exactly_once() {
        let mut m = monster(
            SpawnTemplate::builder("troll")
                .near_death(30.0, AbilityUse::new("regrow"))
                .offense(AbilityUse::new("smash"))
                .build(),
        );
        // near-death pick index 0, then coin flip 1 (defense)
        let mut rng = SequenceRng::new().with_ints([0, 1]);
        let now = Timestamp::from_secs(1);

        let plan = select_periodic(&mut m, &input(0.25), &mut rng, now).expect("plan");
        match plan {
            CastPlan::Cast { slot, ability, .. } => {
                assert_eq!(slot.category, AbilityCategory::NearDeath);
                assert_eq!(ability.name, "regrow");
            }
            other => panic!("expected near-death cast, got {other:?}"),
        }
        assert!(m.has_cast_near_death);

        // Still below threshold: falls through to the coin flip.
        let plan = select_periodic(&mut m, &input(0.1), &mut rng, now).expect("plan");
        assert_eq!(plan, CastPlan::Deferred);
    }

    #[test]
    fn near_death_waits_for_threshold() {
        let mut m = monster(
            SpawnTemplate::builder("troll")
                .near_death(30.0, AbilityUse::new("regrow"))
                .build(),
        );
        // coin flip 0 => offense, which is empty => melee
        let mut rng = SequenceRng::new().with_ints([0]);
        let plan = select_periodic(&mut m, &input(0.5), &mut rng, Timestamp::ZERO);
        assert_eq!(plan, Ok(CastPlan::Melee));
        assert!(!m.has_cast_near_death);
    }

    #[test]
    fn on_death_requires_missing_health() {
        let mut m = monster(
            SpawnTemplate::builder("bomb")
                .on_death(AbilityUse::new("explode"))
                .build(),
        );
        let mut rng = SequenceRng::new();
        assert_eq!(
            select_on_damage(&mut m, &input(1.0), &mut rng, Timestamp::ZERO),
            Ok(None)
        );
        let plan = select_on_damage(&mut m, &input(0.0), &mut rng, Timestamp::ZERO)
            .expect("plan")
            .expect("cast");
        assert!(matches!(plan, CastPlan::Cast { ability, .. } if ability.name == "explode"));
    }

    #[test]
    fn empty_category_is_an_error() {
        let mut m = monster(SpawnTemplate::builder("rat").build());
        let mut rng = SequenceRng::new();
        assert_eq!(
            select_from(
                &mut m,
                AbilityCategory::Defense,
                &input(1.0),
                &mut rng,
                Timestamp::ZERO
            ),
            Err(CombatError::EmptyAbilityCategory(AbilityCategory::Defense))
        );
    }

    #[test]
    fn cast_targets_follow_ability_kind() {
        let mut m = monster(
            SpawnTemplate::builder("shaman")
                .offense(AbilityUse::new("hex").with_target(CastTarget::Group))
                .offense(AbilityUse::new("zap").with_target(CastTarget::Random))
                .offense(AbilityUse::new("shield").with_target(CastTarget::Caster))
                .offense(AbilityUse::new("storm").with_target(CastTarget::None))
                .build(),
        );
        let grouped = SelectionInput {
            caster: EntityId(1),
            health_fraction: 1.0,
            aggressor: Some(EntityId(2)),
            aggressor_group: Some((GroupId(7), vec![EntityId(2), EntityId(3)])),
        };
        // picks: hex (0); zap (1) then member index 1; shield (2); storm (3)
        let mut rng = SequenceRng::new().with_ints([0, 1, 1, 2, 3]);
        let now = Timestamp::ZERO;
        let target_of = |plan: CastPlan| match plan {
            CastPlan::Cast { target, .. } => target,
            other => panic!("unexpected {other:?}"),
        };

        let cat = AbilityCategory::Offense;
        let hex = select_from(&mut m, cat, &grouped, &mut rng, now).expect("hex");
        assert_eq!(target_of(hex), Some(TargetSelector::Group(GroupId(7))));
        let zap = select_from(&mut m, cat, &grouped, &mut rng, now).expect("zap");
        assert_eq!(target_of(zap), Some(TargetSelector::Single(EntityId(3))));
        let shield = select_from(&mut m, cat, &grouped, &mut rng, now).expect("shield");
        assert_eq!(target_of(shield), Some(TargetSelector::Single(EntityId(1))));
        let storm = select_from(&mut m, cat, &grouped, &mut rng, now).expect("storm");
        assert_eq!(target_of(storm), None);

        // Ungrouped aggressor: the group is just the aggressor.
        let mut solo = monster(
            SpawnTemplate::builder("shaman")
                .offense(AbilityUse::new("hex").with_target(CastTarget::Group))
                .build(),
        );
        let plan = select_from(&mut solo, cat, &input(1.0), &mut rng, now).expect("hex");
        assert_eq!(target_of(plan), Some(TargetSelector::Single(EntityId(2))));
    }
}

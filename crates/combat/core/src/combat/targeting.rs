//! Target resolution: expands a castable's intents into the creatures it affects.
//!
//! Per intent, candidates are discovered shape by shape (shapeless scope, map,
//! cross, line, square, tile), capped at `max_targets`, then filtered:
//!
//! - non-creatures and merchants never qualify;
//! - a monster caster drops monsters unless the intent is `HOSTILE`;
//! - players are dropped unless the intent is `FRIENDLY`;
//! - the caster is dropped unless the intent is `SELF`.
//!
//! Results keep discovery order. An entity found by several shapes or intents
//! appears once, at its first position. Resolution never mutates the world.

use crate::env::{Castable, IntentFlags, IntentScope, SpellUseType, TargetingIntent};
use crate::state::{Creature, EntityId, GroupId, Position, RelativeDirection, WorldState};

/// Explicit target of an ability use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetSelector {
    Single(EntityId),
    /// Every member of the group acts as an explicit target in turn.
    Group(GroupId),
}

/// Read-only query over the world.
#[derive(Clone, Copy, Debug)]
pub struct TargetResolver<'w> {
    world: &'w WorldState,
}

impl<'w> TargetResolver<'w> {
    pub fn new(world: &'w WorldState) -> Self {
        Self { world }
    }

    /// Resolves `castable` for `caster` aimed at an optional explicit target.
    pub fn resolve(
        &self,
        caster: EntityId,
        castable: &Castable,
        target: Option<EntityId>,
    ) -> Vec<EntityId> {
        let Some(caster) = self.world.creature(caster) else {
            return Vec::new();
        };
        let target = target.and_then(|id| self.world.creature(id));
        let mut resolved = Vec::new();
        for intent in &castable.intents {
            for id in self.resolve_intent(caster, intent, target) {
                push_unique(&mut resolved, id);
            }
        }
        resolved
    }

    /// Resolves `castable` for a [`TargetSelector`].
    ///
    /// A group selector resolves each member as the explicit target and
    /// concatenates the results.
    pub fn resolve_selector(
        &self,
        caster: EntityId,
        castable: &Castable,
        selector: Option<TargetSelector>,
    ) -> Vec<EntityId> {
        match selector {
            None => self.resolve(caster, castable, None),
            Some(TargetSelector::Single(target)) => self.resolve(caster, castable, Some(target)),
            Some(TargetSelector::Group(group)) => {
                let mut resolved = Vec::new();
                for member in self.world.group_members(group) {
                    for id in self.resolve(caster, castable, Some(member)) {
                        push_unique(&mut resolved, id);
                    }
                }
                resolved
            }
        }
    }

    fn resolve_intent(
        &self,
        caster: &Creature,
        intent: &TargetingIntent,
        target: Option<&Creature>,
    ) -> Vec<EntityId> {
        let origin = match intent.use_type {
            SpellUseType::NoTarget => caster,
            SpellUseType::Target => target.unwrap_or(caster),
        };

        let mut candidates = Vec::new();

        if intent.is_shapeless() {
            match (intent.use_type, intent.scope) {
                (SpellUseType::Target, _) => {
                    if let Some(target) = target {
                        candidates.push(target.id);
                    }
                }
                (SpellUseType::NoTarget, IntentScope::Caster) => candidates.push(caster.id),
                (SpellUseType::NoTarget, IntentScope::Group) => match caster.group {
                    Some(group) => candidates.extend(self.world.group_members(group)),
                    None => candidates.push(caster.id),
                },
                (SpellUseType::NoTarget, IntentScope::None) => {}
            }
        }

        if intent.map {
            candidates.extend(self.world.creatures_on_map(origin.map));
        }

        for cross in &intent.cross {
            for direction in crate::state::Direction::ALL {
                candidates.extend(self.world.entities_in_line(
                    origin.map,
                    origin.position,
                    direction,
                    u32::from(cross.radius),
                ));
            }
            candidates.push(origin.id);
        }

        for line in &intent.line {
            let direction = origin.direction.resolve(line.direction);
            candidates.extend(self.world.entities_in_line(
                origin.map,
                origin.position,
                direction,
                u32::from(line.length),
            ));
            candidates.push(origin.id);
        }

        for square in &intent.square {
            if square.side == 0 {
                continue;
            }
            // Even sides extend one tile further toward +x and +y.
            let radius = i32::from((square.side - 1) / 2);
            let extent = i32::from(square.side) - 1;
            let min = Position::new(origin.position.x - radius, origin.position.y - radius);
            let max = Position::new(min.x + extent, min.y + extent);
            candidates.extend(
                self.world
                    .entities_in_rect(origin.map, min, max)
                    .into_iter()
                    .filter(|id| self.world.contains_creature(*id)),
            );
        }

        for tile in &intent.tile {
            if tile.direction != RelativeDirection::None {
                let direction = origin.direction.resolve(tile.direction);
                let position = origin.position.step(direction);
                if let Some(id) = self.world.creature_at(origin.map, position) {
                    candidates.push(id);
                }
            } else if tile.relative_x != 0 || tile.relative_y != 0 {
                let position = Position::new(
                    origin.position.x + tile.relative_x,
                    origin.position.y + tile.relative_y,
                );
                candidates.extend(self.world.entities_at(origin.map, position));
            }
        }

        let mut unique = Vec::with_capacity(candidates.len());
        for id in candidates {
            push_unique(&mut unique, id);
        }
        if intent.max_targets > 0 {
            unique.truncate(intent.max_targets as usize);
        }

        unique
            .into_iter()
            .filter(|id| self.admits(caster, intent.flags, *id))
            .collect()
    }

    fn admits(&self, caster: &Creature, flags: IntentFlags, id: EntityId) -> bool {
        let Some(candidate) = self.world.creature(id) else {
            return false;
        };
        if !candidate.alive || candidate.is_merchant() {
            return false;
        }
        if caster.is_monster() && candidate.is_monster() && !flags.contains(IntentFlags::HOSTILE) {
            return false;
        }
        if candidate.is_player() && !flags.contains(IntentFlags::FRIENDLY) {
            return false;
        }
        if candidate.id == caster.id && !flags.contains(IntentFlags::SELF) {
            return false;
        }
        true
    }
}

fn push_unique(list: &mut Vec<EntityId>, id: EntityId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::{SpawnTemplate, TileShape};
    use crate::state::{
        CreatureKind, Direction, Group, ItemDropType, ItemPayload, MapId, MapState, MonsterState,
        Timestamp, WorldItem,
    };
    use crate::stats::{CreatureStats, Variance};

    const MAP: MapId = MapId(1);

    fn world() -> WorldState {
        let mut world = WorldState::new();
        world.add_map(MapState::new(MAP, "arena", 16, 16));
        world
    }

    fn add_monster(world: &mut WorldState, x: i32, y: i32) -> EntityId {
        let id = world.allocate_id();
        let template = Arc::new(SpawnTemplate::builder("imp").build());
        let creature = Creature::new(
            id,
            "imp",
            CreatureKind::Monster(Box::new(MonsterState::new(template, Variance::NEUTRAL))),
            MAP,
            Position::new(x, y),
            CreatureStats::fixed(1, 50, 10),
        );
        world.insert_creature(creature).expect("monster")
    }

    fn add_player(world: &mut WorldState, x: i32, y: i32) -> EntityId {
        let id = world.allocate_id();
        let creature = Creature::player(
            id,
            format!("hero{}", id.0),
            MAP,
            Position::new(x, y),
            CreatureStats::fixed(1, 100, 10),
        );
        world.insert_creature(creature).expect("player")
    }

    fn add_merchant(world: &mut WorldState, x: i32, y: i32) -> EntityId {
        let id = world.allocate_id();
        world
            .insert_creature(Creature::merchant(id, "vendor", MAP, Position::new(x, y)))
            .expect("merchant")
    }

    fn everyone() -> IntentFlags {
        IntentFlags::HOSTILE | IntentFlags::FRIENDLY | IntentFlags::SELF
    }

    #[test]
    fn map_wide_excludes_merchants_and_self_without_flag() {
        let mut world = world();
        let caster = add_monster(&mut world, 1, 1);
        let hero = add_player(&mut world, 5, 5);
        let _vendor = add_merchant(&mut world, 6, 6);
        let ally = add_monster(&mut world, 9, 9);

        let castable = Castable::new("quake").with_intent(
            TargetingIntent::untargeted()
                .with_map()
                .with_flags(IntentFlags::HOSTILE | IntentFlags::FRIENDLY),
        );
        let targets = TargetResolver::new(&world).resolve(caster, &castable, None);
        assert_eq!(targets, vec![hero, ally]);

        let castable = Castable::new("quake").with_intent(
            TargetingIntent::untargeted().with_map().with_flags(everyone()),
        );
        let targets = TargetResolver::new(&world).resolve(caster, &castable, None);
        assert_eq!(targets, vec![caster, hero, ally]);
    }

    #[test]
    fn monster_caster_without_hostile_flag_skips_monsters() {
        let mut world = world();
        let caster = add_monster(&mut world, 1, 1);
        let hero = add_player(&mut world, 2, 1);
        let _other = add_monster(&mut world, 1, 2);

        let castable = Castable::new("nova").with_intent(
            TargetingIntent::untargeted()
                .with_square(3)
                .with_flags(IntentFlags::FRIENDLY),
        );
        assert_eq!(
            TargetResolver::new(&world).resolve(caster, &castable, None),
            vec![hero]
        );
    }

    #[test]
    fn max_targets_caps_in_discovery_order() {
        let mut world = world();
        let caster = add_monster(&mut world, 8, 8);
        let players: Vec<EntityId> = (0..5).map(|x| add_player(&mut world, x, 0)).collect();

        let castable = Castable::new("chain").with_intent(
            TargetingIntent::untargeted()
                .with_map()
                .with_flags(IntentFlags::FRIENDLY)
                .with_max_targets(2),
        );
        let targets = TargetResolver::new(&world).resolve(caster, &castable, None);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets, vec![players[0]]);

        let castable = Castable::new("chain").with_intent(
            TargetingIntent::untargeted()
                .with_line(RelativeDirection::Front, 10)
                .with_flags(IntentFlags::FRIENDLY)
                .with_max_targets(3),
        );
        // Caster at (8, 8) faces south by default; nothing stands below it.
        assert!(TargetResolver::new(&world).resolve(caster, &castable, None).is_empty());
    }

    #[test]
    fn cross_includes_origin_and_four_arms() {
        let mut world = world();
        let caster = add_monster(&mut world, 0, 0);
        let target = add_player(&mut world, 5, 5);
        let north = add_player(&mut world, 5, 3);
        let east = add_player(&mut world, 6, 5);
        let far = add_player(&mut world, 5, 9);
        let diagonal = add_player(&mut world, 6, 6);

        let castable = Castable::new("blast").with_intent(
            TargetingIntent::targeted()
                .with_cross(2)
                .with_flags(IntentFlags::FRIENDLY),
        );
        let targets = TargetResolver::new(&world).resolve(caster, &castable, Some(target));
        assert_eq!(targets, vec![north, east, target]);
        assert!(!targets.contains(&far));
        assert!(!targets.contains(&diagonal));
    }

    #[test]
    fn line_follows_origin_facing() {
        let mut world = world();
        let caster = add_monster(&mut world, 4, 4);
        if let Some(c) = world.creature_mut(caster) {
            c.direction = Direction::East;
        }
        let ahead = add_player(&mut world, 6, 4);
        let behind = add_player(&mut world, 2, 4);
        let left = add_player(&mut world, 4, 2);

        let resolver = TargetResolver::new(&world);
        let front = Castable::new("breath").with_intent(
            TargetingIntent::untargeted()
                .with_line(RelativeDirection::Front, 3)
                .with_flags(IntentFlags::FRIENDLY),
        );
        assert_eq!(resolver.resolve(caster, &front, None), vec![ahead]);

        let left_line = Castable::new("sweep").with_intent(
            TargetingIntent::untargeted()
                .with_line(RelativeDirection::Left, 3)
                .with_flags(IntentFlags::FRIENDLY),
        );
        assert_eq!(resolver.resolve(caster, &left_line, None), vec![left]);
        assert!(!resolver.resolve(caster, &front, None).contains(&behind));
    }

    #[test]
    fn tile_shapes_use_direction_or_offset() {
        let mut world = world();
        let caster = add_monster(&mut world, 4, 4);
        let south = add_player(&mut world, 4, 5);
        let offset = add_player(&mut world, 7, 1);

        let castable = Castable::new("poke").with_intent(
            TargetingIntent::untargeted()
                .with_tile(TileShape {
                    direction: RelativeDirection::Front,
                    relative_x: 0,
                    relative_y: 0,
                })
                .with_tile(TileShape {
                    direction: RelativeDirection::None,
                    relative_x: 3,
                    relative_y: -3,
                })
                .with_tile(TileShape {
                    direction: RelativeDirection::None,
                    relative_x: 0,
                    relative_y: 0,
                })
                .with_flags(IntentFlags::FRIENDLY),
        );
        // Default facing is south.
        assert_eq!(
            TargetResolver::new(&world).resolve(caster, &castable, None),
            vec![south, offset]
        );
    }

    #[test]
    fn front_tile_skips_items_under_the_creature() {
        let mut world = world();
        let caster = add_monster(&mut world, 4, 4);
        let gold = world.allocate_id();
        world
            .insert_item(WorldItem {
                id: gold,
                payload: ItemPayload::Gold { amount: 10 },
                map: MAP,
                position: Position::new(4, 5),
                drop_type: ItemDropType::Normal,
                allowed_looters: Vec::new(),
                dropped_at: Timestamp::ZERO,
            })
            .expect("gold");
        let hero = add_player(&mut world, 4, 5);

        let castable = Castable::new("poke").with_intent(
            TargetingIntent::untargeted()
                .with_tile(TileShape {
                    direction: RelativeDirection::Front,
                    relative_x: 0,
                    relative_y: 0,
                })
                .with_flags(IntentFlags::FRIENDLY),
        );
        assert_eq!(
            TargetResolver::new(&world).resolve(caster, &castable, None),
            vec![hero]
        );
    }

    #[test]
    fn even_square_covers_full_side() {
        let mut world = world();
        let caster = add_monster(&mut world, 4, 4);
        let corner = add_player(&mut world, 6, 6);
        let near = add_player(&mut world, 3, 3);
        let outside = add_player(&mut world, 2, 4);

        let castable = Castable::new("slam").with_intent(
            TargetingIntent::untargeted()
                .with_square(4)
                .with_flags(IntentFlags::FRIENDLY),
        );
        let targets = TargetResolver::new(&world).resolve(caster, &castable, None);
        assert_eq!(targets, vec![near, corner]);
        assert!(!targets.contains(&outside));
    }

    #[test]
    fn shapeless_scopes() {
        let mut world = world();
        let caster = add_player(&mut world, 0, 0);
        let friend = add_player(&mut world, 15, 15);
        world.add_group(Group::new(GroupId(3), [caster, friend]));
        let monster = add_monster(&mut world, 3, 3);

        let resolver = TargetResolver::new(&world);
        let heal_party = Castable::new("party heal").with_intent(
            TargetingIntent::untargeted()
                .with_scope(IntentScope::Group)
                .with_flags(IntentFlags::FRIENDLY | IntentFlags::SELF),
        );
        assert_eq!(resolver.resolve(caster, &heal_party, None), vec![caster, friend]);

        let bolt = Castable::new("bolt")
            .with_intent(TargetingIntent::targeted().with_flags(IntentFlags::HOSTILE));
        assert_eq!(resolver.resolve(caster, &bolt, Some(monster)), vec![monster]);
        assert!(resolver.resolve(caster, &bolt, None).is_empty());

        let nothing = Castable::new("fizzle")
            .with_intent(TargetingIntent::untargeted().with_flags(everyone()));
        assert!(resolver.resolve(caster, &nothing, None).is_empty());
    }

    #[test]
    fn overlapping_shapes_are_deduplicated() {
        let mut world = world();
        let caster = add_monster(&mut world, 4, 4);
        let hero = add_player(&mut world, 4, 5);

        let castable = Castable::new("double")
            .with_intent(
                TargetingIntent::untargeted()
                    .with_square(3)
                    .with_map()
                    .with_flags(IntentFlags::FRIENDLY),
            )
            .with_intent(
                TargetingIntent::untargeted()
                    .with_square(5)
                    .with_flags(IntentFlags::FRIENDLY),
            );
        assert_eq!(
            TargetResolver::new(&world).resolve(caster, &castable, None),
            vec![hero]
        );
    }

    #[test]
    fn group_selector_resolves_each_member() {
        let mut world = world();
        let caster = add_monster(&mut world, 0, 0);
        let a = add_player(&mut world, 3, 3);
        let b = add_player(&mut world, 10, 10);
        let bystander = add_player(&mut world, 4, 3);
        world.add_group(Group::new(GroupId(1), [a, b]));

        let castable = Castable::new("curse")
            .with_intent(TargetingIntent::targeted().with_flags(IntentFlags::FRIENDLY));
        let targets = TargetResolver::new(&world).resolve_selector(
            caster,
            &castable,
            Some(TargetSelector::Group(GroupId(1))),
        );
        assert_eq!(targets, vec![a, b]);
        assert!(!targets.contains(&bystander));
    }
}

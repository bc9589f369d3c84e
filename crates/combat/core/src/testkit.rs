//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::combat::{CombatContext, TargetSelector, UseOutcome, use_ability};
use crate::config::CombatConfig;
use crate::control::ControlBuffer;
use crate::env::{AbilityUse, ContentTables, SpawnTemplate};
use crate::error::CombatError;
use crate::events::CombatEvent;
use crate::rng::SequenceRng;
use crate::state::{
    Creature, CreatureKind, EntityId, MapId, MapState, MonsterState, Position, Timestamp,
    WorldState,
};
use crate::stats::{CreatureStats, Variance};

pub(crate) const MAP: MapId = MapId(1);

pub(crate) struct Harness {
    pub world: WorldState,
    pub content: ContentTables,
    pub control: ControlBuffer,
    pub rng: SequenceRng,
    pub config: CombatConfig,
    pub now: Timestamp,
    pub events: Vec<CombatEvent>,
}

impl Harness {
    pub fn new() -> Self {
        let mut world = WorldState::new();
        world.add_map(MapState::new(MAP, "arena", 16, 16));
        Self {
            world,
            content: ContentTables::new(),
            control: ControlBuffer::new(),
            rng: SequenceRng::new(),
            config: CombatConfig::default(),
            now: Timestamp::from_secs(100),
            events: Vec::new(),
        }
    }

    /// Runs `f` with a fresh context and keeps the events it emitted.
    pub fn run<R>(&mut self, f: impl FnOnce(&mut WorldState, &mut CombatContext<'_>) -> R) -> R {
        let mut ctx = CombatContext::new(
            &self.content,
            &self.control,
            &mut self.rng,
            &self.config,
            self.now,
        );
        let result = f(&mut self.world, &mut ctx);
        self.events.extend(ctx.take_events());
        result
    }

    pub fn use_ability(
        &mut self,
        caster: EntityId,
        castable: &str,
        ability: Option<&AbilityUse>,
        selector: Option<TargetSelector>,
    ) -> Result<UseOutcome, CombatError> {
        self.run(|world, ctx| use_ability(world, ctx, caster, castable, ability, selector))
    }

    pub fn spawn_monster(&mut self, template: SpawnTemplate, x: i32, y: i32) -> EntityId {
        let id = self.world.allocate_id();
        let name = template.name.clone();
        let state = MonsterState::new(Arc::new(template), Variance::NEUTRAL);
        let creature = Creature::new(
            id,
            name,
            CreatureKind::Monster(Box::new(state)),
            MAP,
            Position::new(x, y),
            CreatureStats::fixed(1, 50, 10),
        );
        self.world.insert_creature(creature).expect("monster fits")
    }

    pub fn spawn_plain_monster(&mut self, x: i32, y: i32) -> EntityId {
        self.spawn_monster(SpawnTemplate::builder("imp").build(), x, y)
    }

    pub fn add_player(&mut self, x: i32, y: i32, hp: u32) -> EntityId {
        let id = self.world.allocate_id();
        let creature = Creature::player(
            id,
            format!("hero{}", id.0),
            MAP,
            Position::new(x, y),
            CreatureStats::fixed(1, hp, 10),
        );
        self.world.insert_creature(creature).expect("player fits")
    }

    pub fn hp(&self, id: EntityId) -> u32 {
        self.world
            .creature(id)
            .map(|c| c.stats.hp.current)
            .expect("creature exists")
    }
}

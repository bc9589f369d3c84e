//! Fixtures shared by the runtime integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use combat_core::{
    BaseStats, Castable, Condition, ContentTables, Creature, CreatureStats, EntityId,
    IntentFlags, ItemDefinition, LootTable, MapId, MapState, Position, SequenceRng, SpawnFlags,
    SpawnTemplate, StatusDefinition, TargetingIntent, Timestamp, WorldState,
};
use combat_runtime::{
    Event, ManualClock, Runtime, RuntimeConfig, RuntimeHandle, StaticScriptHost,
};
use tokio::sync::broadcast;

pub const MAP: MapId = MapId(1);
pub const HERO: EntityId = EntityId(1);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn hostile_arrow(name: &str, damage: u32) -> Castable {
    Castable::new(name)
        .with_intent(TargetingIntent::targeted().with_flags(IntentFlags::HOSTILE))
        .with_damage(damage, damage)
}

/// Goblins roll 40 hit points under an unseeded [`SequenceRng`].
pub fn content() -> ContentTables {
    let goblin_stats = BaseStats {
        level: 3,
        hp: 20,
        ..BaseStats::default()
    };
    ContentTables::new()
        .with_castable(hostile_arrow("arrow", 5))
        .with_castable(hostile_arrow("ballista", 500))
        .with_castable(
            Castable::new("freeze")
                .with_intent(TargetingIntent::targeted().with_flags(IntentFlags::HOSTILE))
                .with_added_status("frozen"),
        )
        .with_castable(
            Castable::new("fireworks")
                .with_intent(TargetingIntent::targeted().with_flags(IntentFlags::HOSTILE))
                .with_damage(500, 500)
                .with_script("fireworks"),
        )
        .with_castable(
            Castable::new("dud")
                .with_intent(TargetingIntent::targeted().with_flags(IntentFlags::HOSTILE))
                .with_script("nowhere"),
        )
        .with_status(StatusDefinition::new("frozen", 40, 30).with_conditions(Condition::FROZEN))
        .with_item(ItemDefinition::new("dagger"))
        .with_loot_table(
            LootTable::new("goblin")
                .with_xp(100)
                .with_gold(50)
                .with_item("dagger"),
        )
        .with_template(
            SpawnTemplate::builder("goblin")
                .stats(goblin_stats)
                .damage(3, 3)
                .loot_table("goblin")
                .build(),
        )
        .with_template(
            SpawnTemplate::builder("totem")
                .stats(goblin_stats)
                .flags(SpawnFlags::DEATH_DISABLED | SpawnFlags::MOVEMENT_DISABLED)
                .build(),
        )
        .with_template(
            SpawnTemplate::builder("statue")
                .stats(goblin_stats)
                .flags(SpawnFlags::AI_DISABLED)
                .build(),
        )
}

/// One 16x16 map with the hero standing at (2, 2).
pub fn world() -> WorldState {
    let mut world = WorldState::new();
    world.add_map(MapState::new(MAP, "field", 16, 16));
    let hero = Creature::player(
        HERO,
        "hero",
        MAP,
        Position::new(2, 2),
        CreatureStats::fixed(5, 100, 20),
    );
    world
        .insert_creature(hero)
        .expect("hero fits on the map");
    world
}

pub struct TestRuntime {
    pub runtime: Runtime,
    pub handle: RuntimeHandle,
    pub clock: ManualClock,
}

pub async fn start(scripts: StaticScriptHost) -> TestRuntime {
    start_with(scripts, SequenceRng::new()).await
}

/// Starts a runtime without automatic ticks.
pub async fn start_with(scripts: StaticScriptHost, rng: SequenceRng) -> TestRuntime {
    init_tracing();
    let clock = ManualClock::new(Timestamp::from_secs(1_000));
    let runtime = Runtime::builder()
        .config(
            RuntimeConfig::default()
                .with_tick_interval(0)
                .with_script_timeout(60_000),
        )
        .world(world())
        .content(Arc::new(content()))
        .scripts(Arc::new(scripts))
        .clock(Arc::new(clock.clone()))
        .rng(rng)
        .build()
        .await
        .expect("runtime builds");
    let handle = runtime.handle();
    TestRuntime {
        runtime,
        handle,
        clock,
    }
}

/// Waits for the next event matching `predicate`, skipping the others.
pub async fn next_matching(
    rx: &mut broadcast::Receiver<Event>,
    predicate: impl Fn(&Event) -> bool,
) -> Event {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("event bus open");
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("event arrives in time")
}

//! Monster instantiation from spawn templates.

use crate::config::CombatConfig;
use crate::env::{ContentOracle, SpawnFlags};
use crate::error::{CombatError, GameError};
use crate::rng::RandomSource;
use crate::state::{Creature, CreatureKind, EntityId, MapId, MonsterState, Position, WorldState};
use crate::stats::{CreatureStats, Variance};

/// Spawns one instance of `template_name` at `position`.
///
/// Rolls the instance's variance and stats, its hostility and whether it
/// wanders, and binds its loot table. A loot table the content does not know
/// is logged and left unbound.
pub fn spawn_monster(
    world: &mut WorldState,
    content: &dyn ContentOracle,
    rng: &mut dyn RandomSource,
    template_name: &str,
    map: MapId,
    position: Position,
) -> Result<EntityId, CombatError> {
    let template = content.require_template(template_name)?;

    let variance = Variance::roll(template.variance, rng);
    let mut stats = CreatureStats::roll(&template.stats, variance);
    stats.offensive_element = template.offensive_element;
    stats.defensive_element = template.defensive_element;

    let mut monster = MonsterState::new(template.clone(), variance);
    monster.hostile = !template.flags.contains(SpawnFlags::AI_DISABLED)
        && rng.next_int(CombatConfig::HOSTILE_ROLL_SIDES) < CombatConfig::HOSTILE_ROLL_BELOW;
    monster.should_wander =
        !template.flags.contains(SpawnFlags::MOVEMENT_DISABLED) && !monster.hostile;
    monster.loot = template
        .loot_table
        .as_deref()
        .and_then(|name| match content.require_loot_table(name) {
            Ok(table) => Some(table.clone()),
            Err(err) => {
                tracing::error!(
                    target: "combat::spawn",
                    template = %template.name,
                    loot_table = name,
                    code = err.error_code(),
                    "loot table not found"
                );
                None
            }
        });

    let id = world.allocate_id();
    let hostile = monster.hostile;
    let creature = Creature::new(
        id,
        template.name.clone(),
        CreatureKind::Monster(Box::new(monster)),
        map,
        position,
        stats,
    );
    world.insert_creature(creature)?;
    tracing::debug!(
        target: "combat::spawn",
        creature = %id,
        template = %template.name,
        map = ?map,
        position = %position,
        variance = variance.coefficient(),
        hostile,
        "monster spawned"
    );
    Ok(id)
}

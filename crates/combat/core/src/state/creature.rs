use crate::state::{
    Condition, Direction, EntityId, GroupId, MapId, MonsterState, Position, StatusSet, Timestamp,
};
use crate::stats::CreatureStats;

/// A kill credited to a player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KillRecord {
    pub name: String,
    pub at: Timestamp,
}

/// Player-only state touched by combat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub experience: u64,
    pub kills: Vec<KillRecord>,
}

impl PlayerState {
    pub fn gain_experience(&mut self, amount: u64) {
        self.experience = self.experience.saturating_add(amount);
    }

    pub fn track_kill(&mut self, name: &str, at: Timestamp) {
        self.kills.push(KillRecord {
            name: name.to_owned(),
            at,
        });
    }

    pub fn kill_count(&self, name: &str) -> usize {
        self.kills.iter().filter(|k| k.name == name).count()
    }
}

/// What a creature is.
#[derive(Clone, Debug, PartialEq)]
pub enum CreatureKind {
    Monster(Box<MonsterState>),
    Player(PlayerState),
    /// Non-combatant vendor. Never targeted by castables or melee.
    Merchant,
}

/// Any living thing placed on a map.
#[derive(Clone, Debug, PartialEq)]
pub struct Creature {
    pub id: EntityId,
    pub name: String,
    pub kind: CreatureKind,
    pub map: MapId,
    pub position: Position,
    pub direction: Direction,
    pub stats: CreatureStats,
    pub statuses: StatusSet,
    pub group: Option<GroupId>,
    /// Most recent creature that damaged this one.
    pub last_hitter: Option<EntityId>,
    /// True while a castable use by this creature is in progress.
    pub casting: bool,
    pub alive: bool,
}

impl Creature {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        kind: CreatureKind,
        map: MapId,
        position: Position,
        stats: CreatureStats,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            map,
            position,
            direction: Direction::default(),
            stats,
            statuses: StatusSet::empty(),
            group: None,
            last_hitter: None,
            casting: false,
            alive: true,
        }
    }

    pub fn player(
        id: EntityId,
        name: impl Into<String>,
        map: MapId,
        position: Position,
        stats: CreatureStats,
    ) -> Self {
        Self::new(id, name, CreatureKind::Player(PlayerState::default()), map, position, stats)
    }

    pub fn merchant(id: EntityId, name: impl Into<String>, map: MapId, position: Position) -> Self {
        Self::new(
            id,
            name,
            CreatureKind::Merchant,
            map,
            position,
            CreatureStats::fixed(1, 1, 0),
        )
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn facing(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn is_monster(&self) -> bool {
        matches!(self.kind, CreatureKind::Monster(_))
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, CreatureKind::Player(_))
    }

    pub fn is_merchant(&self) -> bool {
        matches!(self.kind, CreatureKind::Merchant)
    }

    pub fn monster(&self) -> Option<&MonsterState> {
        match &self.kind {
            CreatureKind::Monster(m) => Some(m),
            _ => None,
        }
    }

    pub fn monster_mut(&mut self) -> Option<&mut MonsterState> {
        match &mut self.kind {
            CreatureKind::Monster(m) => Some(m),
            _ => None,
        }
    }

    pub fn player_state(&self) -> Option<&PlayerState> {
        match &self.kind {
            CreatureKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn player_state_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            CreatureKind::Player(p) => Some(p),
            _ => None,
        }
    }

    /// `hp / max_hp`.
    pub fn health_fraction(&self) -> f64 {
        self.stats.hp.fraction()
    }

    pub fn conditions(&self) -> Condition {
        self.statuses.conditions()
    }

    pub fn casting_allowed(&self) -> bool {
        !self.conditions().intersects(Condition::FORBIDS_CASTING)
    }

    pub fn movement_allowed(&self) -> bool {
        !self.conditions().intersects(Condition::FORBIDS_MOVEMENT)
    }

    /// Monsters and players are on opposite sides; merchants are on nobody's.
    pub fn is_hostile_to(&self, other: &Creature) -> bool {
        (self.is_monster() && other.is_player()) || (self.is_player() && other.is_monster())
    }

    /// Same side and a different creature.
    pub fn is_friendly_to(&self, other: &Creature) -> bool {
        self.id != other.id
            && ((self.is_monster() && other.is_monster())
                || (self.is_player() && other.is_player()))
    }

    pub fn shares_group_with(&self, other: &Creature) -> bool {
        matches!((self.group, other.group), (Some(a), Some(b)) if a == b)
    }
}

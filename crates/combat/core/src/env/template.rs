//! Monster spawn templates.
//!
//! A template is shared by every monster spawned from it. Per-instance values
//! (rolled stats, cooldown stamps, aggro) live on the monster itself.

use super::Element;

bitflags::bitflags! {
    /// Behavior switches on a spawn template.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct SpawnFlags: u8 {
        /// Never walks.
        const MOVEMENT_DISABLED = 1 << 0;
        /// No decisions at all: never hostile, never casts.
        const AI_DISABLED = 1 << 1;
        /// Cannot die: lethal damage restores full hit points.
        const DEATH_DISABLED = 1 << 2;
    }
}

/// Unrolled base statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaseStats {
    pub level: u8,
    pub hp: u32,
    pub mp: u32,
    pub str: u8,
    pub int: u8,
    pub wis: u8,
    pub con: u8,
    pub dex: u8,
}

/// Inclusive melee damage range, before variance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRange {
    pub min: u32,
    pub max: u32,
}

impl DamageRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Who a selected ability is aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastTarget {
    /// The current aggressor.
    #[default]
    Attacker,
    /// The aggressor's whole group (the aggressor alone when ungrouped).
    Group,
    /// One uniformly chosen member of the aggressor's group.
    Random,
    /// The monster itself.
    Caster,
    /// No target; the castable's own intents decide.
    None,
}

/// One entry of an ability list: a castable plus its per-use parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AbilityUse {
    pub name: String,
    /// Overrides the castable's damage range when `max_damage > 0`.
    pub min_damage: u32,
    pub max_damage: u32,
    /// Cooldown in seconds.
    pub interval_secs: u64,
    pub target: CastTarget,
}

impl AbilityUse {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_damage(mut self, min_damage: u32, max_damage: u32) -> Self {
        self.min_damage = min_damage;
        self.max_damage = max_damage;
        self
    }

    pub fn with_target(mut self, target: CastTarget) -> Self {
        self.target = target;
        self
    }

    /// Per-use damage bounds, if this entry overrides the castable's.
    pub fn damage_override(&self) -> Option<(u32, u32)> {
        (self.max_damage > 0).then_some((self.min_damage, self.max_damage))
    }
}

/// Abilities tried once when hit points first fall to a threshold.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NearDeathAbilities {
    /// Percentage of maximum hit points at or below which the category fires.
    pub health_percent: f64,
    pub castables: Vec<AbilityUse>,
}

/// The four ability categories of a monster.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AbilityGroup {
    pub offense: Vec<AbilityUse>,
    pub defense: Vec<AbilityUse>,
    pub on_death: Vec<AbilityUse>,
    pub near_death: Option<NearDeathAbilities>,
}

/// Blueprint for spawning monsters.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpawnTemplate {
    pub name: String,
    pub flags: SpawnFlags,
    pub stats: BaseStats,
    /// Spread applied to rolled stats and melee damage, typically in `[0, 1]`.
    pub variance: f64,
    pub damage: DamageRange,
    pub offensive_element: Element,
    pub defensive_element: Element,
    pub abilities: AbilityGroup,
    pub loot_table: Option<String>,
    pub script: Option<String>,
}

impl SpawnTemplate {
    pub fn builder(name: impl Into<String>) -> SpawnTemplateBuilder {
        SpawnTemplateBuilder::new(name)
    }
}

/// Fluent construction of [`SpawnTemplate`]s.
#[derive(Clone, Debug)]
pub struct SpawnTemplateBuilder {
    template: SpawnTemplate,
}

impl SpawnTemplateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            template: SpawnTemplate {
                name: name.into(),
                ..SpawnTemplate::default()
            },
        }
    }

    pub fn flags(mut self, flags: SpawnFlags) -> Self {
        self.template.flags = flags;
        self
    }

    pub fn stats(mut self, stats: BaseStats) -> Self {
        self.template.stats = stats;
        self
    }

    pub fn variance(mut self, variance: f64) -> Self {
        self.template.variance = variance;
        self
    }

    pub fn damage(mut self, min: u32, max: u32) -> Self {
        self.template.damage = DamageRange::new(min, max);
        self
    }

    pub fn elements(mut self, offensive: Element, defensive: Element) -> Self {
        self.template.offensive_element = offensive;
        self.template.defensive_element = defensive;
        self
    }

    pub fn offense(mut self, ability: AbilityUse) -> Self {
        self.template.abilities.offense.push(ability);
        self
    }

    pub fn defense(mut self, ability: AbilityUse) -> Self {
        self.template.abilities.defense.push(ability);
        self
    }

    pub fn on_death(mut self, ability: AbilityUse) -> Self {
        self.template.abilities.on_death.push(ability);
        self
    }

    pub fn near_death(mut self, health_percent: f64, ability: AbilityUse) -> Self {
        let group = self
            .template
            .abilities
            .near_death
            .get_or_insert_with(NearDeathAbilities::default);
        group.health_percent = health_percent;
        group.castables.push(ability);
        self
    }

    pub fn loot_table(mut self, name: impl Into<String>) -> Self {
        self.template.loot_table = Some(name.into());
        self
    }

    pub fn script(mut self, name: impl Into<String>) -> Self {
        self.template.script = Some(name.into());
        self
    }

    pub fn build(self) -> SpawnTemplate {
        self.template
    }
}

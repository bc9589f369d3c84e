//! Status, item and loot definitions.

use crate::state::Condition;

/// A named status that castables add or remove.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusDefinition {
    pub name: String,
    /// Display icon. Also the status identity on a creature.
    pub icon: u16,
    pub duration_secs: u64,
    pub conditions: Condition,
}

impl StatusDefinition {
    pub fn new(name: impl Into<String>, icon: u16, duration_secs: u64) -> Self {
        Self {
            name: name.into(),
            icon,
            duration_secs,
            conditions: Condition::empty(),
        }
    }

    pub fn with_conditions(mut self, conditions: Condition) -> Self {
        self.conditions = conditions;
        self
    }
}

/// A named item that can be dropped into the world.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemDefinition {
    pub name: String,
    pub sprite: u16,
    pub value: u32,
}

impl ItemDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Rewards granted when a monster is killed by a player.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LootTable {
    pub name: String,
    pub xp: u64,
    pub gold: u32,
    /// Item names dropped on every kill.
    pub items: Vec<String>,
}

impl LootTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_xp(mut self, xp: u64) -> Self {
        self.xp = xp;
        self
    }

    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.items.push(item.into());
        self
    }
}

//! Monster-only state: template binding, ability cooldowns, aggro and the
//! per-instance AI flags.

use std::sync::Arc;

use crate::combat::AggroLedger;
use crate::env::{AbilityGroup, AbilityUse, LootTable, SpawnFlags, SpawnTemplate};
use crate::state::{EntityId, Timestamp};
use crate::stats::Variance;

/// Ability list a castable is chosen from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityCategory {
    Offense,
    Defense,
    OnDeath,
    NearDeath,
}

/// Position of one ability inside an [`AbilityBook`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySlot {
    pub category: AbilityCategory,
    pub index: usize,
}

/// An ability with its last successful selection time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityEntry {
    pub ability: AbilityUse,
    pub last_cast: Option<Timestamp>,
}

impl AbilityEntry {
    fn new(ability: &AbilityUse) -> Self {
        Self {
            ability: ability.clone(),
            last_cast: None,
        }
    }

    /// True when the cooldown has elapsed at `now` (or the ability was never cast).
    pub fn is_ready(&self, now: Timestamp) -> bool {
        match self.last_cast {
            None => true,
            Some(last) => now >= last.saturating_add_secs(self.ability.interval_secs),
        }
    }
}

/// Per-instance copy of a template's ability lists, carrying cooldown stamps.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityBook {
    offense: Vec<AbilityEntry>,
    defense: Vec<AbilityEntry>,
    on_death: Vec<AbilityEntry>,
    near_death: Vec<AbilityEntry>,
    near_death_percent: f64,
}

impl AbilityBook {
    pub fn from_group(group: &AbilityGroup) -> Self {
        let entries =
            |list: &[AbilityUse]| -> Vec<AbilityEntry> { list.iter().map(AbilityEntry::new).collect() };
        let (near_death, near_death_percent) = match &group.near_death {
            Some(nd) => (entries(&nd.castables), nd.health_percent),
            None => (Vec::new(), 0.0),
        };
        Self {
            offense: entries(&group.offense),
            defense: entries(&group.defense),
            on_death: entries(&group.on_death),
            near_death,
            near_death_percent,
        }
    }

    pub fn category(&self, category: AbilityCategory) -> &[AbilityEntry] {
        match category {
            AbilityCategory::Offense => &self.offense,
            AbilityCategory::Defense => &self.defense,
            AbilityCategory::OnDeath => &self.on_death,
            AbilityCategory::NearDeath => &self.near_death,
        }
    }

    fn category_mut(&mut self, category: AbilityCategory) -> &mut Vec<AbilityEntry> {
        match category {
            AbilityCategory::Offense => &mut self.offense,
            AbilityCategory::Defense => &mut self.defense,
            AbilityCategory::OnDeath => &mut self.on_death,
            AbilityCategory::NearDeath => &mut self.near_death,
        }
    }

    pub fn entry(&self, slot: AbilitySlot) -> Option<&AbilityEntry> {
        self.category(slot.category).get(slot.index)
    }

    /// Records a successful selection at `now`.
    pub fn stamp(&mut self, slot: AbilitySlot, now: Timestamp) {
        if let Some(entry) = self.category_mut(slot.category).get_mut(slot.index) {
            entry.last_cast = Some(now);
        }
    }

    pub fn near_death_percent(&self) -> f64 {
        self.near_death_percent
    }
}

/// State only monsters carry.
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterState {
    pub template: Arc<SpawnTemplate>,
    pub variance: Variance,
    pub abilities: AbilityBook,
    pub aggro: AggroLedger,
    /// Loot resolved from the template's table at spawn.
    pub loot: Option<LootTable>,
    pub hostile: bool,
    pub should_wander: bool,
    /// Set once the near-death category has been attempted.
    pub has_cast_near_death: bool,
    /// Creature the monster is currently fighting.
    pub target: Option<EntityId>,
    pub last_action: Option<Timestamp>,
    /// Set while the monster has nothing to fight.
    pub idle: bool,
}

impl MonsterState {
    pub fn new(template: Arc<SpawnTemplate>, variance: Variance) -> Self {
        let abilities = AbilityBook::from_group(&template.abilities);
        Self {
            template,
            variance,
            abilities,
            aggro: AggroLedger::default(),
            loot: None,
            hostile: false,
            should_wander: false,
            has_cast_near_death: false,
            target: None,
            last_action: None,
            idle: true,
        }
    }

    pub fn flags(&self) -> SpawnFlags {
        self.template.flags
    }

    pub fn ai_disabled(&self) -> bool {
        self.flags().contains(SpawnFlags::AI_DISABLED)
    }

    pub fn movement_disabled(&self) -> bool {
        self.flags().contains(SpawnFlags::MOVEMENT_DISABLED)
    }

    pub fn death_disabled(&self) -> bool {
        self.flags().contains(SpawnFlags::DEATH_DISABLED)
    }

    /// Script bound to this monster's hooks.
    pub fn script(&self) -> Option<&str> {
        self.template.script.as_deref()
    }

    /// Leaves idle mode.
    pub fn awaken(&mut self) {
        self.idle = false;
    }

    /// Enters idle mode and forgets the current target.
    pub fn sleep(&mut self) {
        self.idle = true;
        self.target = None;
    }

    /// Whether the action delay has elapsed at `now`.
    pub fn can_act(&self, now: Timestamp, action_delay_ms: u64) -> bool {
        match self.last_action {
            None => true,
            Some(last) => now.millis_since(last) >= action_delay_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_is_measured_from_last_cast() {
        let mut entry = AbilityEntry::new(&AbilityUse::new("bolt").with_interval(5));
        assert!(entry.is_ready(Timestamp::ZERO));
        entry.last_cast = Some(Timestamp::from_secs(10));
        assert!(!entry.is_ready(Timestamp::from_millis(14_999)));
        assert!(entry.is_ready(Timestamp::from_secs(15)));
    }

    #[test]
    fn book_copies_template_lists() {
        let template = SpawnTemplate::builder("wolf")
            .offense(AbilityUse::new("bite"))
            .near_death(25.0, AbilityUse::new("howl"))
            .build();
        let mut book = AbilityBook::from_group(&template.abilities);
        assert_eq!(book.category(AbilityCategory::Offense).len(), 1);
        assert!(book.category(AbilityCategory::Defense).is_empty());
        assert_eq!(book.near_death_percent(), 25.0);

        let slot = AbilitySlot {
            category: AbilityCategory::NearDeath,
            index: 0,
        };
        book.stamp(slot, Timestamp(42));
        assert_eq!(book.entry(slot).and_then(|e| e.last_cast), Some(Timestamp(42)));
    }
}

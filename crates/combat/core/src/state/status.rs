//! Status effects carried by creatures.
//!
//! Effects are keyed by their icon: applying a status whose icon is already
//! present refreshes it in place. Each effect stores `expires_at` so the
//! decision loop can prune in bulk when several ticks elapse at once.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::env::StatusDefinition;
use crate::state::Timestamp;

bitflags::bitflags! {
    /// Conditions imposed by a status effect.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Condition: u16 {
        const FROZEN = 1 << 0;
        const PARALYZED = 1 << 1;
        const ASLEEP = 1 << 2;
        const BLINDED = 1 << 3;
        const COMA = 1 << 4;
        const POISONED = 1 << 5;
        const MUTED = 1 << 6;
    }
}

impl Condition {
    /// Any of these forbids using castables.
    pub const FORBIDS_CASTING: Self = Self::FROZEN
        .union(Self::PARALYZED)
        .union(Self::ASLEEP)
        .union(Self::COMA);

    /// Any of these forbids walking and turning.
    pub const FORBIDS_MOVEMENT: Self = Self::FROZEN
        .union(Self::PARALYZED)
        .union(Self::ASLEEP)
        .union(Self::COMA);
}

/// A single active status.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveStatus {
    pub name: String,
    pub icon: u16,
    pub conditions: Condition,
    pub expires_at: Timestamp,
    /// Castable that applied the status, if any.
    pub source: Option<String>,
}

impl ActiveStatus {
    pub fn from_definition(
        definition: &StatusDefinition,
        now: Timestamp,
        source: Option<&str>,
    ) -> Self {
        Self {
            name: definition.name.clone(),
            icon: definition.icon,
            conditions: definition.conditions,
            expires_at: now.saturating_add_secs(definition.duration_secs),
            source: source.map(str::to_owned),
        }
    }
}

/// Active status effects on a creature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSet {
    effects: ArrayVec<ActiveStatus, { CombatConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusSet {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Adds `status`, replacing any effect that shares its icon.
    ///
    /// Returns false if the set is full and the status could not be stored.
    pub fn add(&mut self, status: ActiveStatus) -> bool {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.icon == status.icon) {
            *existing = status;
            return true;
        }
        self.effects.try_push(status).is_ok()
    }

    /// Removes the effect with `icon`, returning it if it was present.
    pub fn remove(&mut self, icon: u16) -> Option<ActiveStatus> {
        let index = self.effects.iter().position(|e| e.icon == icon)?;
        Some(self.effects.remove(index))
    }

    pub fn contains(&self, icon: u16) -> bool {
        self.effects.iter().any(|e| e.icon == icon)
    }

    pub fn get(&self, icon: u16) -> Option<&ActiveStatus> {
        self.effects.iter().find(|e| e.icon == icon)
    }

    /// Drops every effect whose expiry is at or before `now`, returning them.
    pub fn remove_expired(&mut self, now: Timestamp) -> Vec<ActiveStatus> {
        let mut expired = Vec::new();
        let mut index = 0;
        while index < self.effects.len() {
            if self.effects[index].expires_at <= now {
                expired.push(self.effects.remove(index));
            } else {
                index += 1;
            }
        }
        expired
    }

    /// Union of the conditions of all stored effects.
    pub fn conditions(&self) -> Condition {
        self.effects
            .iter()
            .fold(Condition::empty(), |acc, e| acc | e.conditions)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveStatus> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

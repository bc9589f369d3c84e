//! Read-only content definitions and the oracle that serves them.
//!
//! Castables, statuses, items, loot tables and spawn templates are authored
//! data. The decision code only ever sees them through [`ContentOracle`], so
//! the embedding runtime decides where they come from.
mod castable;
mod catalog;
mod intent;
mod tables;
mod template;

use std::sync::Arc;

pub use castable::{
    Animation, CastAnimations, Castable, CastableEffects, DamageEffect, Element, HealEffect,
    StatusChanges,
};
pub use catalog::{ItemDefinition, LootTable, StatusDefinition};
pub use intent::{
    CrossShape, IntentFlags, IntentScope, LineShape, SpellUseType, SquareShape, TargetingIntent,
    TileShape,
};
pub use tables::ContentTables;
pub use template::{
    AbilityGroup, AbilityUse, BaseStats, CastTarget, DamageRange, NearDeathAbilities, SpawnFlags,
    SpawnTemplate, SpawnTemplateBuilder,
};

use crate::error::CombatError;

/// Lookup of authored content by name.
pub trait ContentOracle: Send + Sync {
    fn castable(&self, name: &str) -> Option<&Castable>;

    fn status(&self, name: &str) -> Option<&StatusDefinition>;

    fn item(&self, name: &str) -> Option<&ItemDefinition>;

    fn loot_table(&self, name: &str) -> Option<&LootTable>;

    fn template(&self, name: &str) -> Option<Arc<SpawnTemplate>>;

    fn require_castable(&self, name: &str) -> Result<&Castable, CombatError> {
        self.castable(name)
            .ok_or_else(|| CombatError::AbilityNotFound(name.to_owned()))
    }

    fn require_status(&self, name: &str) -> Result<&StatusDefinition, CombatError> {
        self.status(name)
            .ok_or_else(|| CombatError::StatusNotFound(name.to_owned()))
    }

    fn require_item(&self, name: &str) -> Result<&ItemDefinition, CombatError> {
        self.item(name)
            .ok_or_else(|| CombatError::ItemNotFound(name.to_owned()))
    }

    fn require_loot_table(&self, name: &str) -> Result<&LootTable, CombatError> {
        self.loot_table(name)
            .ok_or_else(|| CombatError::LootTableNotFound(name.to_owned()))
    }

    fn require_template(&self, name: &str) -> Result<Arc<SpawnTemplate>, CombatError> {
        self.template(name)
            .ok_or_else(|| CombatError::TemplateNotFound(name.to_owned()))
    }
}

//! Creature statistics and their per-instance variance.
mod variance;

pub use variance::{VariantStat, Variance};

use crate::env::{BaseStats, Element};
use crate::rng::RandomSource;
use crate::state::ResourceMeter;

/// Rolled statistics of a living creature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureStats {
    pub level: u8,
    pub hp: ResourceMeter,
    pub mp: ResourceMeter,
    pub str: u8,
    pub int: u8,
    pub wis: u8,
    pub con: u8,
    pub dex: u8,
    pub offensive_element: Element,
    pub defensive_element: Element,
    /// Takes precedence over `offensive_element` unless `Element::None`.
    pub offensive_element_override: Element,
}

impl CreatureStats {
    /// Rolls every stat of `base` through one variance coefficient.
    ///
    /// Level is not varied.
    pub fn roll(base: &BaseStats, variance: Variance) -> Self {
        Self {
            level: base.level,
            hp: ResourceMeter::full(variance.apply(base.hp)),
            mp: ResourceMeter::full(variance.apply(base.mp)),
            str: variance.apply(base.str),
            int: variance.apply(base.int),
            wis: variance.apply(base.wis),
            con: variance.apply(base.con),
            dex: variance.apply(base.dex),
            ..Self::default()
        }
    }

    /// Fixed stats, used for players and merchants.
    pub fn fixed(level: u8, hp: u32, mp: u32) -> Self {
        Self {
            level,
            hp: ResourceMeter::full(hp),
            mp: ResourceMeter::full(mp),
            ..Self::default()
        }
    }

    /// Offensive element after applying the override.
    pub fn effective_offensive_element(&self) -> Element {
        if self.offensive_element_override == Element::None {
            self.offensive_element
        } else {
            self.offensive_element_override
        }
    }

    /// Element used when attacking with `castable_element`.
    ///
    /// `Random` picks a concrete element, `None` falls back to the creature's
    /// own offensive element, anything else is used as is.
    pub fn resolve_attack_element(
        &self,
        castable_element: Element,
        rng: &mut dyn RandomSource,
    ) -> Element {
        match castable_element {
            Element::Random => Element::random(rng),
            Element::None => self.effective_offensive_element(),
            explicit => explicit,
        }
    }
}

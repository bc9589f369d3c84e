//! Castable (ability) definitions.

use strum::IntoEnumIterator;

use super::TargetingIntent;
use crate::rng::RandomSource;

/// Elemental affinity of an attack or a creature.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::EnumIter, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    #[default]
    None,
    Fire,
    Water,
    Wind,
    Earth,
    Light,
    Dark,
    Wood,
    Metal,
    Undead,
    /// Placeholder resolved to a concrete element at use time.
    Random,
}

impl Element {
    /// True for every element that can actually be dealt.
    pub fn is_concrete(self) -> bool {
        !matches!(self, Element::None | Element::Random)
    }

    /// Uniform pick among concrete elements.
    pub fn random(rng: &mut dyn RandomSource) -> Self {
        let concrete: Vec<Element> = Element::iter().filter(|e| e.is_concrete()).collect();
        rng.choose_index(concrete.len())
            .and_then(|index| concrete.get(index).copied())
            .unwrap_or_default()
    }
}

/// Visual effect reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    pub id: u16,
    pub speed: u16,
}

/// Presentation cues played once per successful use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CastAnimations {
    /// Played on every affected target.
    pub on_target: Option<Animation>,
    /// Played once at the caster.
    pub spell_effect: Option<Animation>,
}

/// Damage dealt by a castable. `max == 0` means "no damage".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageEffect {
    pub min: u32,
    pub max: u32,
}

impl DamageEffect {
    pub fn is_empty(&self) -> bool {
        self.max == 0
    }
}

/// Healing done by a castable. `max == 0` means "no healing".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealEffect {
    pub min: u32,
    pub max: u32,
}

impl HealEffect {
    pub fn is_empty(&self) -> bool {
        self.max == 0
    }
}

/// Statuses added to and removed from every affected target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusChanges {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

/// Everything a castable does to its targets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CastableEffects {
    pub animations: CastAnimations,
    pub sound: Option<u8>,
    pub damage: Option<DamageEffect>,
    pub heal: Option<HealEffect>,
    pub statuses: StatusChanges,
    /// When set, the script handles every effect and built-in effects are skipped.
    pub script_override: bool,
}

impl CastableEffects {
    pub fn damage(&self) -> Option<DamageEffect> {
        self.damage.filter(|d| !d.is_empty())
    }

    pub fn heal(&self) -> Option<HealEffect> {
        self.heal.filter(|h| !h.is_empty())
    }
}

/// A named ability definition.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Castable {
    pub name: String,
    pub element: Element,
    /// Melee-class ability: may be used without any resolved target.
    pub is_assail: bool,
    /// Script owning the ability's behavior. Built-in effects are skipped when set.
    pub script: Option<String>,
    pub intents: Vec<TargetingIntent>,
    pub effects: CastableEffects,
}

impl Castable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_intent(mut self, intent: TargetingIntent) -> Self {
        self.intents.push(intent);
        self
    }

    pub fn with_damage(mut self, min: u32, max: u32) -> Self {
        self.effects.damage = Some(DamageEffect { min, max });
        self
    }

    pub fn with_heal(mut self, min: u32, max: u32) -> Self {
        self.effects.heal = Some(HealEffect { min, max });
        self
    }

    pub fn with_added_status(mut self, status: impl Into<String>) -> Self {
        self.effects.statuses.add.push(status.into());
        self
    }

    pub fn with_removed_status(mut self, status: impl Into<String>) -> Self {
        self.effects.statuses.remove.push(status.into());
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    pub fn assail(mut self) -> Self {
        self.is_assail = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PcgRng;

    #[test]
    fn random_element_is_always_concrete() {
        let mut rng = PcgRng::seeded(3);
        for _ in 0..200 {
            assert!(Element::random(&mut rng).is_concrete());
        }
    }

    #[test]
    fn zero_max_effects_are_empty() {
        let castable = Castable::new("dud").with_damage(5, 0).with_heal(0, 0);
        assert!(castable.effects.damage().is_none());
        assert!(castable.effects.heal().is_none());
    }
}

//! Per-instance stat variance.
//!
//! Each monster rolls one coefficient at spawn and reuses it for every stat
//! and every melee hit, so a "strong" individual is strong across the board.
//!
//! ```text
//! buffed      = coin flip
//! coefficient = 1 + U * v     when buffed
//!             = 1 - U * v     otherwise         (U uniform in [0, 1))
//! stat        = round(base + base * coefficient)
//! ```
//!
//! The result saturates to the target integer type. Rounding is
//! half-to-even.

use crate::rng::RandomSource;

/// Variance coefficient of one creature.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variance(f64);

impl Variance {
    /// The coefficient used when a template specifies no spread.
    pub const NEUTRAL: Self = Self(1.0);

    /// Rolls a coefficient for a template spread `v`.
    ///
    /// Non-finite or negative spreads are treated as zero.
    pub fn roll(spread: f64, rng: &mut dyn RandomSource) -> Self {
        let spread = if spread.is_finite() { spread.max(0.0) } else { 0.0 };
        let buffed = rng.coin_flip();
        let delta = rng.next_float() * spread;
        if buffed {
            Self(1.0 + delta)
        } else {
            Self(1.0 - delta)
        }
    }

    pub const fn from_coefficient(coefficient: f64) -> Self {
        Self(coefficient)
    }

    pub const fn coefficient(self) -> f64 {
        self.0
    }

    /// `round(base + base * coefficient)`, saturated to `T`.
    pub fn apply<T: VariantStat>(self, base: T) -> T {
        let base = base.to_f64();
        T::from_f64_saturating((base + base * self.0).round_ties_even())
    }

    /// Melee damage: uniform integer in `[min, max]`, scaled by the coefficient and truncated.
    pub fn scale_damage(self, min: u32, max: u32, rng: &mut dyn RandomSource) -> u32 {
        let roll = f64::from(rng.range_inclusive(min, max));
        u32::from_f64_saturating((roll * self.0).trunc())
    }
}

impl Default for Variance {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Integer stat types that variance can be applied to.
pub trait VariantStat: Copy {
    fn to_f64(self) -> f64;

    /// Converts with saturation at both ends. NaN maps to zero.
    fn from_f64_saturating(value: f64) -> Self;
}

macro_rules! impl_variant_stat {
    ($($ty:ty),*) => {
        $(
            impl VariantStat for $ty {
                fn to_f64(self) -> f64 {
                    f64::from(self)
                }

                fn from_f64_saturating(value: f64) -> Self {
                    // `as` saturates float-to-int conversions and maps NaN to 0.
                    value as $ty
                }
            }
        )*
    };
}

impl_variant_stat!(u8, u16, u32);

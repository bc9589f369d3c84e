/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Minimum delay between two decisions of the same monster.
    pub action_delay_ms: u64,
    /// Chebyshev radius within which a hostile monster notices players.
    pub aggro_radius: u32,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STATUS_EFFECTS: usize = 16;

    // ===== spawn rolls =====
    /// A monster is hostile when `rng.next_int(HOSTILE_ROLL_SIDES) < HOSTILE_ROLL_BELOW`.
    pub const HOSTILE_ROLL_SIDES: u32 = 7;
    pub const HOSTILE_ROLL_BELOW: u32 = 2;

    // ===== assail presentation =====
    pub const ASSAIL_ANIMATION: u16 = 1;
    pub const ASSAIL_ANIMATION_SPEED: u16 = 20;
    pub const ASSAIL_SOUND: u8 = 1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ACTION_DELAY_MS: u64 = 800;
    pub const DEFAULT_AGGRO_RADIUS: u32 = 6;

    pub fn new() -> Self {
        Self {
            action_delay_ms: Self::DEFAULT_ACTION_DELAY_MS,
            aggro_radius: Self::DEFAULT_AGGRO_RADIUS,
        }
    }

    pub fn with_action_delay(mut self, action_delay_ms: u64) -> Self {
        self.action_delay_ms = action_delay_ms;
        self
    }

    pub fn with_aggro_radius(mut self, aggro_radius: u32) -> Self {
        self.aggro_radius = aggro_radius;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

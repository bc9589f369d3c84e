//! Targeting intents: the shapes an ability affects.

use crate::state::RelativeDirection;

bitflags::bitflags! {
    /// Who an intent may affect.
    ///
    /// Flags are named from a player's point of view: `HOSTILE` admits
    /// monsters, `FRIENDLY` admits players.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct IntentFlags: u8 {
        const HOSTILE = 1 << 0;
        const FRIENDLY = 1 << 1;
        /// The caster itself.
        const SELF = 1 << 2;
        const GROUP = 1 << 3;
        const PVP = 1 << 4;
    }
}

/// Whether an intent needs a target entity as origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellUseType {
    #[default]
    Target,
    NoTarget,
}

/// Scope of a shapeless no-target intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntentScope {
    #[default]
    None,
    Caster,
    Group,
}

/// Plus-shaped area: the origin and `radius` tiles in each cardinal direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossShape {
    pub radius: u8,
}

/// Straight line of `length` tiles from the origin, relative to the caster's facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineShape {
    pub direction: RelativeDirection,
    pub length: u8,
}

/// Axis-aligned square of `side` tiles centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquareShape {
    pub side: u8,
}

/// Single tile at an offset from the origin.
///
/// With a direction other than `None`, the tile directly adjacent in that
/// relative direction is used and the offsets are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileShape {
    pub direction: RelativeDirection,
    pub relative_x: i32,
    pub relative_y: i32,
}

/// One targeting shape of a castable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetingIntent {
    pub use_type: SpellUseType,
    pub scope: IntentScope,
    /// Every creature on the origin's map.
    pub map: bool,
    pub cross: Vec<CrossShape>,
    pub line: Vec<LineShape>,
    pub square: Vec<SquareShape>,
    pub tile: Vec<TileShape>,
    pub flags: IntentFlags,
    /// Cap on the creatures this intent yields. Zero means unlimited.
    pub max_targets: u32,
}

impl TargetingIntent {
    pub fn targeted() -> Self {
        Self::default()
    }

    pub fn untargeted() -> Self {
        Self {
            use_type: SpellUseType::NoTarget,
            ..Self::default()
        }
    }

    /// No area shape at all: the intent yields exactly its scope.
    pub fn is_shapeless(&self) -> bool {
        !self.map
            && self.cross.is_empty()
            && self.line.is_empty()
            && self.square.is_empty()
            && self.tile.is_empty()
    }

    pub fn with_flags(mut self, flags: IntentFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_scope(mut self, scope: IntentScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_map(mut self) -> Self {
        self.map = true;
        self
    }

    pub fn with_cross(mut self, radius: u8) -> Self {
        self.cross.push(CrossShape { radius });
        self
    }

    pub fn with_line(mut self, direction: RelativeDirection, length: u8) -> Self {
        self.line.push(LineShape { direction, length });
        self
    }

    pub fn with_square(mut self, side: u8) -> Self {
        self.square.push(SquareShape { side });
        self
    }

    pub fn with_tile(mut self, tile: TileShape) -> Self {
        self.tile.push(tile);
        self
    }

    pub fn with_max_targets(mut self, max_targets: u32) -> Self {
        self.max_targets = max_targets;
        self
    }
}

//! Error taxonomy for combat-core.
//!
//! Failures fall into three families:
//!
//! - **Configuration gaps**: a referenced ability, status, script, item, loot
//!   table or template has no definition. Always non-fatal; the caller logs and
//!   skips the one step that needed it.
//! - **Precondition violations**: a programming-contract breach, such as
//!   selecting from an empty ability category.
//! - **Lookup failures**: the creature or map addressed by a command is not in
//!   the world (usually because it was already removed).
//!
//! Transient refusals (cooldown not elapsed, casting forbidden, no targets) are
//! not errors at all; they surface as [`crate::combat::UseOutcome::Refused`].

use crate::state::{AbilityCategory, EntityId, MapId, Position};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Referenced content is missing; the step is skipped and work continues.
    ConfigurationGap,

    /// Caller broke a documented contract.
    PreconditionViolation,

    /// Addressed entity or map does not exist (anymore).
    Validation,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigurationGap => "configuration-gap",
            Self::PreconditionViolation => "precondition-violation",
            Self::Validation => "validation",
        }
    }

    /// Returns true if the surrounding work may continue after this error.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::ConfigurationGap | Self::Validation)
    }
}

/// Common interface implemented by combat-core error types.
pub trait GameError: core::fmt::Display {
    fn severity(&self) -> ErrorSeverity;

    /// Stable machine-readable code for logs and metrics.
    fn error_code(&self) -> &'static str;
}

/// Errors raised by combat-core operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("castable '{0}' is not defined")]
    AbilityNotFound(String),

    #[error("status '{0}' is not defined")]
    StatusNotFound(String),

    #[error("script '{0}' is not defined")]
    ScriptNotFound(String),

    #[error("item '{0}' is not defined")]
    ItemNotFound(String),

    #[error("loot table '{0}' is not defined")]
    LootTableNotFound(String),

    #[error("spawn template '{0}' is not defined")]
    TemplateNotFound(String),

    #[error("{0:?} ability list is empty")]
    EmptyAbilityCategory(AbilityCategory),

    #[error("creature {0} not found")]
    CreatureNotFound(EntityId),

    #[error("creature {0} is not a monster")]
    NotAMonster(EntityId),

    #[error("map {0:?} not found")]
    MapNotFound(MapId),

    #[error("position {position:?} is outside map {map:?}")]
    OutOfBounds { map: MapId, position: Position },
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        use CombatError::*;
        match self {
            AbilityNotFound(_) | StatusNotFound(_) | ScriptNotFound(_) | ItemNotFound(_)
            | LootTableNotFound(_) | TemplateNotFound(_) => ErrorSeverity::ConfigurationGap,

            EmptyAbilityCategory(_) => ErrorSeverity::PreconditionViolation,

            CreatureNotFound(_) | NotAMonster(_) | MapNotFound(_) | OutOfBounds { .. } => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        use CombatError::*;
        match self {
            AbilityNotFound(_) => "COMBAT_ABILITY_NOT_FOUND",
            StatusNotFound(_) => "COMBAT_STATUS_NOT_FOUND",
            ScriptNotFound(_) => "COMBAT_SCRIPT_NOT_FOUND",
            ItemNotFound(_) => "COMBAT_ITEM_NOT_FOUND",
            LootTableNotFound(_) => "COMBAT_LOOT_TABLE_NOT_FOUND",
            TemplateNotFound(_) => "COMBAT_TEMPLATE_NOT_FOUND",
            EmptyAbilityCategory(_) => "COMBAT_EMPTY_ABILITY_CATEGORY",
            CreatureNotFound(_) => "COMBAT_CREATURE_NOT_FOUND",
            NotAMonster(_) => "COMBAT_NOT_A_MONSTER",
            MapNotFound(_) => "COMBAT_MAP_NOT_FOUND",
            OutOfBounds { .. } => "COMBAT_OUT_OF_BOUNDS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_gaps_are_recoverable() {
        let err = CombatError::StatusNotFound("poison".into());
        assert_eq!(err.severity(), ErrorSeverity::ConfigurationGap);
        assert!(err.severity().is_recoverable());
        assert_eq!(err.error_code(), "COMBAT_STATUS_NOT_FOUND");
    }

    #[test]
    fn empty_category_is_a_contract_breach() {
        let err = CombatError::EmptyAbilityCategory(AbilityCategory::Offense);
        assert_eq!(err.severity(), ErrorSeverity::PreconditionViolation);
        assert!(!err.severity().is_recoverable());
    }
}

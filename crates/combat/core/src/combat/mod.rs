//! Combat decisions: who to hit, with what, and what happens to them.
mod aggro;
mod context;
mod damage;
mod melee;
mod resolver;
mod selector;
mod targeting;

pub use aggro::AggroLedger;
pub use context::CombatContext;
pub use damage::{apply_damage, apply_heal};
pub use melee::{AssailOutcome, assail};
pub use resolver::{RefusalReason, UseOutcome, set_casting, use_ability};
pub use selector::{
    CastPlan, SelectionInput, can_cast, select_from, select_on_damage, select_periodic,
};
pub use targeting::{TargetResolver, TargetSelector};

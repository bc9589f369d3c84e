//! Topic-based event bus for runtime events.
//!
//! Combat events come straight from `combat-core`; lifecycle and script events
//! are produced by the workers.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{LifecycleEvent, ScriptEvent};

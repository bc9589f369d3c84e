//! Async runtime for the creature combat engine.
//!
//! This crate wires `combat-core` to tokio: a single world worker owns the
//! [`WorldState`](combat_core::WorldState), commands arrive through a cloneable
//! [`RuntimeHandle`], deaths are finalized from a deferred control queue, and
//! script hooks run on their own tasks with a timeout.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`scripting`] abstracts the script host behind async traits
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod clock;
pub mod config;
pub mod events;
pub mod random;
pub mod runtime;
pub mod scripting;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RuntimeConfig;
pub use events::{Event, EventBus, LifecycleEvent, ScriptEvent, Topic};
pub use random::ThreadRandom;
pub use runtime::{Runtime, RuntimeBuilder};
pub use scripting::{
    FnScript, ON_DAMAGE, ON_HEAL, ON_HEAR, ON_USE, Script, ScriptCallRecord, ScriptError,
    ScriptHost, ScriptValue, StaticScriptHost,
};

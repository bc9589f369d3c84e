//! Worker tasks that back the runtime orchestration.
//!
//! The world worker owns the creature state and executes commands, while the
//! script dispatcher runs hook calls off the worker loop.

mod script;
mod world;

pub use script::{ScriptCall, ScriptDispatcher};
pub use world::{Command, WorldWorker, WorldWorkerParts};

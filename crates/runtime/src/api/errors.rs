//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, combat rules and scripts so
//! clients can bubble them up with consistent context.
use combat_core::{CombatError, GameError};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::scripting::ScriptError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("world worker command channel closed")]
    CommandChannelClosed,

    #[error("world worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("world worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires content to be configured before building")]
    MissingContent,

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The script call was aborted before it produced a result.
    #[error("script call for {creature} was aborted")]
    ScriptAborted { creature: combat_core::EntityId },
}

impl RuntimeError {
    /// Stable code for logs and clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            RuntimeError::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            RuntimeError::MissingContent => "RUNTIME_MISSING_CONTENT",
            RuntimeError::Combat(err) => err.error_code(),
            RuntimeError::Script(ScriptError::TimedOut { .. }) => "RUNTIME_SCRIPT_TIMEOUT",
            RuntimeError::Script(_) => "RUNTIME_SCRIPT_FAILED",
            RuntimeError::ScriptAborted { .. } => "RUNTIME_SCRIPT_ABORTED",
        }
    }
}

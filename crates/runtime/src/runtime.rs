//! High-level runtime orchestrator.
//!
//! The runtime owns the world worker, wires up command and event channels, and
//! exposes a builder-based API for embedding the combat engine.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use combat_core::{ContentOracle, RandomSource, WorldState};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::clock::{Clock, SystemClock};
use crate::config::RuntimeConfig;
use crate::events::EventBus;
use crate::random::ThreadRandom;
use crate::scripting::{ScriptHost, StaticScriptHost};
use crate::workers::{Command, ScriptDispatcher, WorldWorker, WorldWorkerParts};

/// Main runtime that runs the creature simulation
///
/// Runtime owns the worker task. [`RuntimeHandle`] provides a cloneable
/// façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    world_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every handle clone has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.world_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<WorldState>,
    content: Option<Arc<dyn ContentOracle>>,
    scripts: Option<Arc<dyn ScriptHost>>,
    clock: Option<Arc<dyn Clock>>,
    rng: Option<Box<dyn RandomSource + Send>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            content: None,
            scripts: None,
            clock: None,
            rng: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide the initial world (maps, groups, pre-placed creatures)
    pub fn world(mut self, world: WorldState) -> Self {
        self.world = Some(world);
        self
    }

    /// Set the required content tables
    pub fn content(mut self, content: Arc<dyn ContentOracle>) -> Self {
        self.content = Some(content);
        self
    }

    /// Set the script host. Defaults to an empty host.
    pub fn scripts(mut self, scripts: Arc<dyn ScriptHost>) -> Self {
        self.scripts = Some(scripts);
        self
    }

    /// Set the time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the random source. Defaults to [`ThreadRandom`].
    pub fn rng(mut self, rng: impl RandomSource + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Build the runtime and start its worker
    pub async fn build(self) -> Result<Runtime> {
        let content = self.content.ok_or(RuntimeError::MissingContent)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let scripts = ScriptDispatcher::new(
            self.scripts
                .unwrap_or_else(|| Arc::new(StaticScriptHost::new())),
            self.config.script_timeout(),
            event_bus.clone(),
        );

        let world_worker = WorldWorker::new(
            WorldWorkerParts {
                world: self.world.unwrap_or_default(),
                content,
                combat: self.config.combat.clone(),
                tick_interval: self.config.tick_interval(),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                rng: self.rng.unwrap_or_else(|| Box::new(ThreadRandom::new())),
                scripts,
                event_bus,
            },
            command_rx,
        );

        let world_worker_handle = tokio::spawn(async move {
            world_worker.run().await;
        });
        info!(target: "runtime::worker", "runtime started");

        Ok(Runtime {
            handle,
            world_worker_handle,
        })
    }
}

//! Script host abstraction.
//!
//! Monsters and castables may be bound to a script by name. The runtime only
//! needs to look a script up, set globals on it and call named functions;
//! the scripting language itself lives behind [`ScriptHost`].
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use combat_core::EntityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// Hook called when a scripted castable is used. Argument: the caster.
pub const ON_USE: &str = "OnUse";
/// Hook called on a damaged monster. Arguments: the monster, the attacker.
/// Global `damage`.
pub const ON_DAMAGE: &str = "OnDamage";
/// Hook called on a healed monster. Arguments: the monster, the healer.
/// Global `heal`.
pub const ON_HEAL: &str = "OnHeal";
/// Hook called when a monster hears speech. Argument: the speaker.
/// Globals `text` and `shout`.
pub const ON_HEAR: &str = "OnHear";

/// Values exchanged with scripts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ScriptValue {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Entity(EntityId),
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Nil => write!(f, "nil"),
            ScriptValue::Bool(value) => write!(f, "{value}"),
            ScriptValue::Int(value) => write!(f, "{value}"),
            ScriptValue::Float(value) => write!(f, "{value}"),
            ScriptValue::Str(value) => write!(f, "{value:?}"),
            ScriptValue::Entity(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ScriptError {
    #[error("script `{script}` has no function `{function}`")]
    MissingFunction { script: String, function: String },

    #[error("script `{script}` failed in `{function}`: {message}")]
    Failed {
        script: String,
        function: String,
        message: String,
    },

    #[error("script `{script}` timed out in `{function}` after {timeout_ms}ms")]
    TimedOut {
        script: String,
        function: String,
        timeout_ms: u64,
    },
}

/// A loaded script.
#[async_trait]
pub trait Script: Send + Sync {
    fn name(&self) -> &str;

    async fn set_global(&self, name: &str, value: ScriptValue);

    async fn call_function(
        &self,
        function: &str,
        args: Vec<ScriptValue>,
    ) -> Result<ScriptValue, ScriptError>;
}

/// Lookup of scripts by name.
pub trait ScriptHost: Send + Sync {
    fn try_get_script(&self, name: &str) -> Option<Arc<dyn Script>>;
}

/// Host with a fixed set of scripts.
#[derive(Clone, Default)]
pub struct StaticScriptHost {
    scripts: HashMap<String, Arc<dyn Script>>,
}

impl StaticScriptHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, script: Arc<dyn Script>) {
        self.scripts.insert(script.name().to_owned(), script);
    }

    pub fn with_script(mut self, script: impl Script + 'static) -> Self {
        self.insert(Arc::new(script));
        self
    }
}

impl ScriptHost for StaticScriptHost {
    fn try_get_script(&self, name: &str) -> Option<Arc<dyn Script>> {
        self.scripts.get(name).cloned()
    }
}

impl fmt::Debug for StaticScriptHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticScriptHost")
            .field("scripts", &self.scripts.keys().collect::<Vec<_>>())
            .finish()
    }
}

type Handler = Arc<dyn Fn(&[ScriptValue], &HashMap<String, ScriptValue>) -> ScriptValue + Send + Sync>;

/// Script whose functions are Rust closures.
///
/// Every call is recorded, which makes it convenient for embedding tests.
/// An optional latency is awaited before each call.
#[derive(Clone)]
pub struct FnScript {
    name: String,
    handlers: HashMap<String, Handler>,
    latency: Option<Duration>,
    globals: Arc<Mutex<HashMap<String, ScriptValue>>>,
    calls: Arc<Mutex<Vec<ScriptCallRecord>>>,
}

/// One recorded call of an [`FnScript`].
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptCallRecord {
    pub function: String,
    pub args: Vec<ScriptValue>,
    /// Globals as they were when the call started.
    pub globals: HashMap<String, ScriptValue>,
}

impl FnScript {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: HashMap::new(),
            latency: None,
            globals: Arc::default(),
            calls: Arc::default(),
        }
    }

    /// Registers `function`.
    pub fn on<F>(mut self, function: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[ScriptValue], &HashMap<String, ScriptValue>) -> ScriptValue + Send + Sync + 'static,
    {
        self.handlers.insert(function.into(), Arc::new(handler));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Calls made so far, oldest first.
    pub async fn calls(&self) -> Vec<ScriptCallRecord> {
        self.calls.lock().await.clone()
    }

    pub async fn global(&self, name: &str) -> Option<ScriptValue> {
        self.globals.lock().await.get(name).cloned()
    }
}

impl fmt::Debug for FnScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnScript")
            .field("name", &self.name)
            .field("functions", &self.handlers.keys().collect::<Vec<_>>())
            .field("latency", &self.latency)
            .finish()
    }
}

#[async_trait]
impl Script for FnScript {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_global(&self, name: &str, value: ScriptValue) {
        self.globals.lock().await.insert(name.to_owned(), value);
    }

    async fn call_function(
        &self,
        function: &str,
        args: Vec<ScriptValue>,
    ) -> Result<ScriptValue, ScriptError> {
        let handler = self
            .handlers
            .get(function)
            .cloned()
            .ok_or_else(|| ScriptError::MissingFunction {
                script: self.name.clone(),
                function: function.to_owned(),
            })?;
        let globals = self.globals.lock().await.clone();
        self.calls.lock().await.push(ScriptCallRecord {
            function: function.to_owned(),
            args: args.clone(),
            globals: globals.clone(),
        });
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(handler(&args, &globals))
    }
}

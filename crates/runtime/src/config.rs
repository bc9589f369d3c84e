//! Runtime configuration structures and loaders.
use std::env;
use std::str::FromStr;
use std::time::Duration;

use combat_core::CombatConfig;

/// Configuration shared by the orchestrator and its workers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    /// Interval of the automatic monster tick. Zero disables it; callers then
    /// drive ticks through [`RuntimeHandle::tick`](crate::RuntimeHandle::tick).
    pub tick_interval_ms: u64,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Upper bound on one script function call.
    pub script_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            tick_interval_ms: 100,
            event_buffer_size: 256,
            command_buffer_size: 32,
            script_timeout_ms: 500,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `COMBAT_TICK_INTERVAL_MS`
    /// - `COMBAT_ACTION_DELAY_MS`
    /// - `COMBAT_AGGRO_RADIUS`
    /// - `COMBAT_SCRIPT_TIMEOUT_MS`
    /// - `COMBAT_EVENT_BUFFER`
    /// - `COMBAT_COMMAND_BUFFER`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(interval) = read_env::<u64>("COMBAT_TICK_INTERVAL_MS") {
            config.tick_interval_ms = interval;
        }
        if let Some(delay) = read_env::<u64>("COMBAT_ACTION_DELAY_MS") {
            config.combat.action_delay_ms = delay;
        }
        if let Some(radius) = read_env::<u32>("COMBAT_AGGRO_RADIUS") {
            config.combat.aggro_radius = radius;
        }
        if let Some(timeout) = read_env::<u64>("COMBAT_SCRIPT_TIMEOUT_MS") {
            config.script_timeout_ms = timeout.max(1);
        }
        if let Some(capacity) = read_env::<usize>("COMBAT_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("COMBAT_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }

        config
    }

    pub fn with_combat(mut self, combat: CombatConfig) -> Self {
        self.combat = combat;
        self
    }

    pub fn with_tick_interval(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    pub fn with_script_timeout(mut self, script_timeout_ms: u64) -> Self {
        self.script_timeout_ms = script_timeout_ms.max(1);
        self
    }

    /// `None` when the automatic tick is disabled.
    pub fn tick_interval(&self) -> Option<Duration> {
        (self.tick_interval_ms > 0).then(|| Duration::from_millis(self.tick_interval_ms))
    }

    pub fn script_timeout(&self) -> Duration {
        Duration::from_millis(self.script_timeout_ms)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok().and_then(|value| value.parse().ok())
}

use crate::config::CombatConfig;
use crate::control::{ControlMessage, ControlSink};
use crate::env::ContentOracle;
use crate::events::CombatEvent;
use crate::rng::RandomSource;
use crate::state::Timestamp;

/// Capabilities and accumulated output of one combat decision.
///
/// The runtime builds a fresh context per command, runs the decision, then
/// drains the collected events.
pub struct CombatContext<'a> {
    pub content: &'a dyn ContentOracle,
    pub control: &'a dyn ControlSink,
    pub rng: &'a mut dyn RandomSource,
    pub config: &'a CombatConfig,
    pub now: Timestamp,
    events: Vec<CombatEvent>,
}

impl<'a> CombatContext<'a> {
    pub fn new(
        content: &'a dyn ContentOracle,
        control: &'a dyn ControlSink,
        rng: &'a mut dyn RandomSource,
        config: &'a CombatConfig,
        now: Timestamp,
    ) -> Self {
        Self {
            content,
            control,
            rng,
            config,
            now,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn enqueue(&self, message: ControlMessage) {
        self.control.enqueue(message);
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Number of events emitted so far; pair with [`Self::events_since`].
    pub fn event_mark(&self) -> usize {
        self.events.len()
    }

    pub fn events_since(&self, mark: usize) -> &[CombatEvent] {
        self.events.get(mark..).unwrap_or(&[])
    }

    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }
}

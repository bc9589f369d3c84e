//! Asynchronous script invocation.
//!
//! Every call runs in its own task, bounded by a timeout. Calls for the same
//! creature are serialised by a per-creature lock, and their abort handles are
//! kept so a creature leaving the world cancels whatever is still running.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use combat_core::EntityId;
use tokio::sync::{Mutex, oneshot};
use tokio::task::AbortHandle;

use crate::events::{Event, EventBus, ScriptEvent};
use crate::scripting::{Script, ScriptError, ScriptHost, ScriptValue};

/// One script function call.
pub struct ScriptCall {
    pub script: Arc<dyn Script>,
    pub function: &'static str,
    pub args: Vec<ScriptValue>,
    /// Globals set right before the call, under the creature lock.
    pub globals: Vec<(&'static str, ScriptValue)>,
}

pub type ScriptReply = oneshot::Receiver<Result<ScriptValue, ScriptError>>;

pub struct ScriptDispatcher {
    host: Arc<dyn ScriptHost>,
    timeout: Duration,
    event_bus: EventBus,
    locks: HashMap<EntityId, Arc<Mutex<()>>>,
    inflight: HashMap<EntityId, Vec<AbortHandle>>,
}

impl ScriptDispatcher {
    pub fn new(host: Arc<dyn ScriptHost>, timeout: Duration, event_bus: EventBus) -> Self {
        Self {
            host,
            timeout,
            event_bus,
            locks: HashMap::new(),
            inflight: HashMap::new(),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Script>> {
        self.host.try_get_script(name)
    }

    /// Starts `call` for `creature` and returns a receiver for its result.
    ///
    /// The receiver errors if the call is aborted.
    pub fn dispatch(&mut self, creature: EntityId, call: ScriptCall) -> ScriptReply {
        let (reply_tx, reply_rx) = oneshot::channel();
        let lock = Arc::clone(self.locks.entry(creature).or_default());
        let timeout = self.timeout;
        let event_bus = self.event_bus.clone();

        let task = tokio::spawn(async move {
            let _guard = lock.lock().await;
            let ScriptCall {
                script,
                function,
                args,
                globals,
            } = call;

            for (name, value) in globals {
                script.set_global(name, value).await;
            }
            let result = match tokio::time::timeout(timeout, script.call_function(function, args))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ScriptError::TimedOut {
                    script: script.name().to_owned(),
                    function: function.to_owned(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };

            let event = match &result {
                Ok(value) => {
                    tracing::debug!(
                        target: "runtime::script",
                        creature = %creature,
                        script = script.name(),
                        function,
                        value = %value,
                        "script call completed"
                    );
                    ScriptEvent::Completed {
                        creature,
                        script: script.name().to_owned(),
                        function: function.to_owned(),
                        value: value.clone(),
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        target: "runtime::script",
                        creature = %creature,
                        script = script.name(),
                        function,
                        error = %error,
                        "script call failed"
                    );
                    ScriptEvent::Failed {
                        creature,
                        script: script.name().to_owned(),
                        function: function.to_owned(),
                        error: error.clone(),
                    }
                }
            };
            event_bus.publish(Event::Script(event));
            if reply_tx.send(result).is_err() {
                tracing::debug!(
                    target: "runtime::script",
                    creature = %creature,
                    "script reply channel closed (caller dropped)"
                );
            }
        });

        let handles = self.inflight.entry(creature).or_default();
        handles.retain(|handle| !handle.is_finished());
        handles.push(task.abort_handle());
        reply_rx
    }

    /// Aborts every unfinished call of `creature`. Returns how many were aborted.
    pub fn abort(&mut self, creature: EntityId) -> usize {
        self.locks.remove(&creature);
        let Some(handles) = self.inflight.remove(&creature) else {
            return 0;
        };
        let mut aborted = 0;
        for handle in handles {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        if aborted > 0 {
            tracing::debug!(
                target: "runtime::script",
                creature = %creature,
                calls = aborted,
                "aborted in-flight script calls"
            );
            self.event_bus.publish(Event::Script(ScriptEvent::Aborted {
                creature,
                calls: aborted,
            }));
        }
        aborted
    }

    /// Number of unfinished calls of `creature`.
    pub fn inflight(&self, creature: EntityId) -> usize {
        self.inflight
            .get(&creature)
            .map_or(0, |handles| handles.iter().filter(|h| !h.is_finished()).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;
    use crate::scripting::{FnScript, ON_DAMAGE, StaticScriptHost};

    fn dispatcher(script: FnScript, timeout_ms: u64) -> (ScriptDispatcher, EventBus) {
        let bus = EventBus::with_capacity(16);
        let host = StaticScriptHost::new().with_script(script);
        (
            ScriptDispatcher::new(Arc::new(host), Duration::from_millis(timeout_ms), bus.clone()),
            bus,
        )
    }

    fn on_damage(dispatcher: &ScriptDispatcher, damage: i64) -> ScriptCall {
        ScriptCall {
            script: dispatcher.resolve("imp").expect("script"),
            function: ON_DAMAGE,
            args: vec![ScriptValue::Entity(EntityId(1)), ScriptValue::Entity(EntityId(2))],
            globals: vec![("damage", ScriptValue::Int(damage))],
        }
    }

    #[tokio::test]
    async fn call_sets_globals_and_replies() {
        let script = FnScript::new("imp").on(ON_DAMAGE, |_, globals| {
            globals.get("damage").cloned().unwrap_or_default()
        });
        let (mut dispatcher, bus) = dispatcher(script, 500);
        let mut events = bus.subscribe(Topic::Script);

        let call = on_damage(&dispatcher, 12);
        let reply = dispatcher.dispatch(EntityId(1), call);
        assert_eq!(reply.await.expect("reply"), Ok(ScriptValue::Int(12)));
        assert!(matches!(
            events.recv().await.expect("event"),
            Event::Script(ScriptEvent::Completed { .. })
        ));
    }

    #[tokio::test]
    async fn dropped_caller_still_completes_the_call() {
        let script = FnScript::new("imp").on(ON_DAMAGE, |_, _| ScriptValue::Int(1));
        let (mut dispatcher, bus) = dispatcher(script, 500);
        let mut events = bus.subscribe(Topic::Script);

        let call = on_damage(&dispatcher, 3);
        drop(dispatcher.dispatch(EntityId(1), call));
        assert!(matches!(
            events.recv().await.expect("event"),
            Event::Script(ScriptEvent::Completed { value: ScriptValue::Int(1), .. })
        ));
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let script = FnScript::new("imp")
            .on(ON_DAMAGE, |_, _| ScriptValue::Nil)
            .with_latency(Duration::from_secs(5));
        let (mut dispatcher, _bus) = dispatcher(script, 20);

        let call = on_damage(&dispatcher, 1);
        let reply = dispatcher.dispatch(EntityId(1), call);
        assert!(matches!(
            reply.await.expect("reply"),
            Err(ScriptError::TimedOut { timeout_ms: 20, .. })
        ));
    }

    #[tokio::test]
    async fn abort_cancels_inflight_calls() {
        let script = FnScript::new("imp")
            .on(ON_DAMAGE, |_, _| ScriptValue::Nil)
            .with_latency(Duration::from_secs(5));
        let (mut dispatcher, bus) = dispatcher(script, 10_000);
        let mut events = bus.subscribe(Topic::Script);

        let call = on_damage(&dispatcher, 1);
        let reply = dispatcher.dispatch(EntityId(1), call);
        tokio::task::yield_now().await;
        assert_eq!(dispatcher.inflight(EntityId(1)), 1);

        assert_eq!(dispatcher.abort(EntityId(1)), 1);
        assert!(reply.await.is_err());
        assert_eq!(
            events.recv().await.expect("event"),
            Event::Script(ScriptEvent::Aborted {
                creature: EntityId(1),
                calls: 1
            })
        );
        assert_eq!(dispatcher.abort(EntityId(1)), 0);
    }
}

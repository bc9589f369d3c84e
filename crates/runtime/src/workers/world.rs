//! World worker that owns the authoritative [`WorldState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs the
//! combat rules on the state, publishes the resulting events and hands script
//! work to the [`ScriptDispatcher`]. Death notifications travel through a
//! separate control queue that is drained in its own select branch, never
//! inline with the command that produced them.

use std::sync::Arc;
use std::time::Duration;

use combat_core::{
    CombatConfig, CombatContext, CombatError, CombatEvent, ContentOracle, ControlMessage,
    ControlSink, Creature, DeathOutcome, EntityId, GameError, MapId, Position, RandomSource,
    TargetSelector, TickOutcome, UseOutcome, WorldState, advance, handle_death, react_to_damage,
    set_casting, spawn_monster, use_ability,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::script::{ScriptCall, ScriptDispatcher};
use crate::api::{Result, RuntimeError};
use crate::clock::Clock;
use crate::events::{Event, EventBus, LifecycleEvent};
use crate::scripting::{ON_DAMAGE, ON_HEAL, ON_HEAR, ON_USE, ScriptValue};

/// Commands that can be sent to the world worker
pub enum Command {
    /// Advance every monster by one step.
    Tick {
        reply: oneshot::Sender<Vec<(EntityId, TickOutcome)>>,
    },
    /// Advance one monster by one step.
    Advance {
        id: EntityId,
        reply: oneshot::Sender<Result<TickOutcome>>,
    },
    /// Use a castable on behalf of any creature.
    UseAbility {
        caster: EntityId,
        castable: String,
        selector: Option<TargetSelector>,
        reply: oneshot::Sender<Result<UseOutcome>>,
    },
    Spawn {
        template: String,
        map: MapId,
        position: Position,
        reply: oneshot::Sender<Result<EntityId>>,
    },
    InsertCreature {
        creature: Box<Creature>,
        reply: oneshot::Sender<Result<EntityId>>,
    },
    /// Remove a creature immediately, aborting its script calls.
    Despawn {
        id: EntityId,
        reply: oneshot::Sender<bool>,
    },
    /// Queue a death notification.
    NotifyDeath {
        id: EntityId,
        reply: oneshot::Sender<()>,
    },
    /// Speech heard by nearby monsters.
    Speak {
        speaker: EntityId,
        text: String,
        shout: bool,
        reply: oneshot::Sender<Result<usize>>,
    },
    /// Query the current world state (read-only).
    Query { reply: oneshot::Sender<WorldState> },
}

/// Messages from tasks spawned by the worker back to the worker.
enum Internal {
    /// A scripted castable finished; clear the caster's casting flag.
    FinishCast { caster: EntityId },
}

/// [`ControlSink`] backed by the worker's unbounded control queue.
struct ControlQueue {
    tx: mpsc::UnboundedSender<ControlMessage>,
}

impl ControlSink for ControlQueue {
    fn enqueue(&self, message: ControlMessage) {
        if self.tx.send(message).is_err() {
            error!(target: "runtime::worker", ?message, "control queue closed");
        }
    }
}

pub struct WorldWorkerParts {
    pub world: WorldState,
    pub content: Arc<dyn ContentOracle>,
    pub combat: CombatConfig,
    pub tick_interval: Option<Duration>,
    pub clock: Arc<dyn Clock>,
    pub rng: Box<dyn RandomSource + Send>,
    pub scripts: ScriptDispatcher,
    pub event_bus: EventBus,
}

/// Background task that owns the world and processes commands.
pub struct WorldWorker {
    world: WorldState,
    content: Arc<dyn ContentOracle>,
    combat: CombatConfig,
    tick_interval: Option<Duration>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RandomSource + Send>,
    scripts: ScriptDispatcher,
    event_bus: EventBus,
    command_rx: mpsc::Receiver<Command>,
    control: ControlQueue,
    control_rx: mpsc::UnboundedReceiver<ControlMessage>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
}

impl WorldWorker {
    pub fn new(parts: WorldWorkerParts, command_rx: mpsc::Receiver<Command>) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        info!(
            target: "runtime::worker",
            creatures = parts.world.creature_ids().len(),
            tick_interval = ?parts.tick_interval,
            "WorldWorker initialized"
        );
        Self {
            world: parts.world,
            content: parts.content,
            combat: parts.combat,
            tick_interval: parts.tick_interval,
            clock: parts.clock,
            rng: parts.rng,
            scripts: parts.scripts,
            event_bus: parts.event_bus,
            command_rx,
            control: ControlQueue { tx: control_tx },
            control_rx,
            internal_tx,
            internal_rx,
        }
    }

    /// Main worker loop. Ends when every command sender is dropped.
    pub async fn run(mut self) {
        let mut ticker = self.tick_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval
        });

        loop {
            tokio::select! {
                biased;

                Some(message) = self.control_rx.recv() => {
                    self.handle_control(message);
                }
                Some(message) = self.internal_rx.recv() => {
                    self.handle_internal(message);
                }
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = async {
                    match ticker.as_mut() {
                        Some(interval) => interval.tick().await,
                        None => std::future::pending().await,
                    }
                } => {
                    self.tick_all();
                }
            }
        }

        // Deaths queued by the last commands are still finalized.
        while let Ok(message) = self.control_rx.try_recv() {
            self.handle_control(message);
        }
        debug!(target: "runtime::worker", "WorldWorker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Tick { reply } => {
                let outcomes = self.tick_all();
                if reply.send(outcomes).is_err() {
                    debug!(target: "runtime::worker", "Tick reply channel closed (caller dropped)");
                }
            }
            Command::Advance { id, reply } => {
                let result = self.advance_one(id).map_err(RuntimeError::from);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Advance reply channel closed (caller dropped)");
                }
            }
            Command::UseAbility {
                caster,
                castable,
                selector,
                reply,
            } => self.handle_use_ability(caster, &castable, selector, reply),
            Command::Spawn {
                template,
                map,
                position,
                reply,
            } => {
                let result = self.handle_spawn(&template, map, position);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Spawn reply channel closed (caller dropped)");
                }
            }
            Command::InsertCreature { creature, reply } => {
                let result = self.world.insert_creature(*creature).map_err(RuntimeError::from);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "InsertCreature reply channel closed (caller dropped)");
                }
            }
            Command::Despawn { id, reply } => {
                let removed = self.handle_despawn(id);
                if reply.send(removed).is_err() {
                    debug!(target: "runtime::worker", "Despawn reply channel closed (caller dropped)");
                }
            }
            Command::NotifyDeath { id, reply } => {
                self.control.enqueue(ControlMessage::HandleDeath(id));
                if reply.send(()).is_err() {
                    debug!(target: "runtime::worker", "NotifyDeath reply channel closed (caller dropped)");
                }
            }
            Command::Speak {
                speaker,
                text,
                shout,
                reply,
            } => {
                let result = self.handle_speak(speaker, text, shout);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Speak reply channel closed (caller dropped)");
                }
            }
            Command::Query { reply } => {
                if reply.send(self.world.clone()).is_err() {
                    debug!(target: "runtime::worker", "Query reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Runs `f` with a fresh combat context, then publishes the events it produced.
    fn with_context<R>(
        &mut self,
        f: impl FnOnce(&mut WorldState, &mut CombatContext<'_>) -> R,
    ) -> R {
        let now = self.clock.now();
        let mut ctx = CombatContext::new(
            self.content.as_ref(),
            &self.control,
            self.rng.as_mut(),
            &self.combat,
            now,
        );
        let result = f(&mut self.world, &mut ctx);
        let events = ctx.take_events();
        self.publish_combat(events);
        result
    }

    fn tick_all(&mut self) -> Vec<(EntityId, TickOutcome)> {
        let monsters: Vec<EntityId> = self
            .world
            .creatures()
            .filter(|c| c.is_monster() && c.alive)
            .map(|c| c.id)
            .collect();

        let mut outcomes = Vec::with_capacity(monsters.len());
        for id in monsters {
            match self.advance_one(id) {
                Ok(TickOutcome::Idle) => {}
                Ok(outcome) => outcomes.push((id, outcome)),
                Err(err) => warn!(
                    target: "runtime::worker",
                    creature = %id,
                    code = err.error_code(),
                    error = %err,
                    "monster step failed"
                ),
            }
        }
        outcomes
    }

    fn advance_one(&mut self, id: EntityId) -> std::result::Result<TickOutcome, CombatError> {
        let (outcome, reactions) = self.with_context(|world, ctx| {
            let mark = ctx.event_mark();
            let outcome = advance(world, ctx, id);
            (outcome, react_to_damage(world, ctx, mark))
        });
        self.finish_reactions(reactions);
        let outcome = outcome?;

        if let TickOutcome::Cast(UseOutcome::Scripted { script, .. }) = &outcome {
            let script = script.clone();
            self.run_cast_script(id, &script, None);
        }
        Ok(outcome)
    }

    fn handle_use_ability(
        &mut self,
        caster: EntityId,
        castable: &str,
        selector: Option<TargetSelector>,
        reply: oneshot::Sender<Result<UseOutcome>>,
    ) {
        let (result, reactions) = self.with_context(|world, ctx| {
            let mark = ctx.event_mark();
            let outcome = use_ability(world, ctx, caster, castable, None, selector);
            (outcome, react_to_damage(world, ctx, mark))
        });
        self.finish_reactions(reactions);

        match result {
            Ok(UseOutcome::Scripted { script, targets }) => {
                let outcome = UseOutcome::Scripted {
                    script: script.clone(),
                    targets,
                };
                self.run_cast_script(caster, &script, Some((outcome, reply)));
            }
            other => {
                if reply.send(other.map_err(RuntimeError::from)).is_err() {
                    debug!(target: "runtime::worker", "UseAbility reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Starts the scripts of scripted castables used in reaction to damage.
    fn finish_reactions(&mut self, reactions: Vec<(EntityId, TickOutcome)>) {
        for (reactor, reaction) in reactions {
            debug!(target: "runtime::worker", creature = %reactor, ?reaction, "reacted to damage");
            if let TickOutcome::Cast(UseOutcome::Scripted { script, .. }) = reaction {
                self.run_cast_script(reactor, &script, None);
            }
        }
    }

    /// Runs the `OnUse` function of a castable script for `caster`.
    ///
    /// A missing script fails the use and clears the casting flag at once.
    /// Otherwise the flag is cleared when the call finishes, and `reply`, if
    /// any, receives the outcome then.
    fn run_cast_script(
        &mut self,
        caster: EntityId,
        script_name: &str,
        reply: Option<(UseOutcome, oneshot::Sender<Result<UseOutcome>>)>,
    ) {
        let Some(script) = self.scripts.resolve(script_name) else {
            let err = CombatError::ScriptNotFound(script_name.to_owned());
            error!(
                target: "runtime::worker",
                caster = %caster,
                script = script_name,
                code = err.error_code(),
                "castable script not found"
            );
            set_casting(&mut self.world, caster, false);
            if let Some((_, reply)) = reply {
                if reply.send(Err(RuntimeError::Combat(err))).is_err() {
                    debug!(target: "runtime::worker", "UseAbility reply channel closed (caller dropped)");
                }
            }
            return;
        };

        let call = ScriptCall {
            script,
            function: ON_USE,
            args: vec![ScriptValue::Entity(caster)],
            globals: Vec::new(),
        };
        let done = self.scripts.dispatch(caster, call);
        let internal = self.internal_tx.clone();
        tokio::spawn(async move {
            let finished = done.await;
            // Queued before replying so a follow-up command sees the flag cleared.
            if internal.send(Internal::FinishCast { caster }).is_err() {
                debug!(target: "runtime::worker", caster = %caster, "internal channel closed (worker stopped)");
            }
            let Some((outcome, tx)) = reply else {
                return;
            };
            let result = match finished {
                Ok(Ok(_)) => Ok(outcome),
                Ok(Err(err)) => Err(RuntimeError::Script(err)),
                Err(_) => Err(RuntimeError::ScriptAborted { creature: caster }),
            };
            if tx.send(result).is_err() {
                debug!(target: "runtime::worker", "UseAbility reply channel closed (caller dropped)");
            }
        });
    }

    fn handle_spawn(&mut self, template: &str, map: MapId, position: Position) -> Result<EntityId> {
        let id = spawn_monster(
            &mut self.world,
            self.content.as_ref(),
            self.rng.as_mut(),
            template,
            map,
            position,
        )?;
        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::Spawned {
                creature: id,
                template: template.to_owned(),
                map,
                position,
            }));
        Ok(id)
    }

    fn handle_despawn(&mut self, id: EntityId) -> bool {
        self.scripts.abort(id);
        if self.world.remove_creature(id).is_none() {
            return false;
        }
        info!(target: "runtime::worker", creature = %id, "despawned");
        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::Despawned { creature: id }));
        true
    }

    /// Dispatches `OnHear` to monsters within earshot. Returns how many heard it.
    fn handle_speak(&mut self, speaker: EntityId, text: String, shout: bool) -> Result<usize> {
        let (map, origin) = {
            let creature = self.world.require_creature(speaker)?;
            (creature.map, creature.position)
        };
        let radius = self.combat.aggro_radius;
        let listeners: Vec<(EntityId, String)> = self
            .world
            .creatures_on_map(map)
            .into_iter()
            .filter(|id| *id != speaker)
            .filter_map(|id| self.world.creature(id))
            .filter(|c| c.alive && c.is_monster())
            .filter(|c| shout || c.position.chebyshev(origin) <= radius)
            .map(|c| (c.id, script_name_of(c)))
            .collect();

        let mut heard = 0;
        for (listener, name) in listeners {
            let Some(script) = self.scripts.resolve(&name) else {
                continue;
            };
            self.scripts.dispatch(
                listener,
                ScriptCall {
                    script,
                    function: ON_HEAR,
                    args: vec![ScriptValue::Entity(speaker)],
                    globals: vec![
                        ("text", ScriptValue::Str(text.clone())),
                        ("shout", ScriptValue::Bool(shout)),
                    ],
                },
            );
            heard += 1;
        }
        Ok(heard)
    }

    fn handle_control(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::HandleDeath(id) => {
                let now = self.clock.now();
                let outcome = handle_death(&mut self.world, self.content.as_ref(), now, id);
                let event = match outcome {
                    DeathOutcome::Ignored => None,
                    DeathOutcome::Revived(creature) => Some(LifecycleEvent::Revived { creature }),
                    DeathOutcome::Fallen(creature) => {
                        self.scripts.abort(creature);
                        Some(LifecycleEvent::Fell { creature })
                    }
                    DeathOutcome::Removed(report) => {
                        self.scripts.abort(report.creature);
                        Some(LifecycleEvent::Died {
                            creature: report.creature,
                            name: report.name,
                            killer: report.killer,
                            looters: report.looters,
                            drops: report.drops,
                        })
                    }
                };
                if let Some(event) = event {
                    self.event_bus.publish(Event::Lifecycle(event));
                }
            }
        }
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::FinishCast { caster } => set_casting(&mut self.world, caster, false),
        }
    }

    /// Publishes combat events and dispatches the reactive script hooks.
    fn publish_combat(&mut self, events: Vec<CombatEvent>) {
        for event in events {
            let hook = match &event {
                CombatEvent::Damaged {
                    target,
                    attacker: Some(attacker),
                    amount,
                    ..
                } => Some((*target, *attacker, ON_DAMAGE, "damage", *amount)),
                CombatEvent::Healed {
                    target,
                    healer,
                    amount,
                } => Some((*target, *healer, ON_HEAL, "heal", *amount)),
                _ => None,
            };
            if let Some((target, source, function, global, amount)) = hook {
                self.dispatch_hook(target, source, function, global, amount);
            }
            self.event_bus.publish(Event::Combat(event));
        }
    }

    fn dispatch_hook(
        &mut self,
        target: EntityId,
        source: EntityId,
        function: &'static str,
        global: &'static str,
        amount: u32,
    ) {
        let Some(name) = self
            .world
            .creature(target)
            .filter(|c| c.is_monster())
            .map(script_name_of)
        else {
            return;
        };
        let Some(script) = self.scripts.resolve(&name) else {
            return;
        };
        self.scripts.dispatch(
            target,
            ScriptCall {
                script,
                function,
                args: vec![ScriptValue::Entity(target), ScriptValue::Entity(source)],
                globals: vec![(global, ScriptValue::Int(i64::from(amount)))],
            },
        );
    }
}

/// Script bound to a monster's hooks: the template's, else one named after it.
fn script_name_of(creature: &Creature) -> String {
    creature
        .monster()
        .and_then(|m| m.script())
        .unwrap_or(creature.name.as_str())
        .to_owned()
}

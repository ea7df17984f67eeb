//! Behavior program execution.
//!
//! A [`BehaviorRuntime`] binds a compiled [`Program`] to the mutable world it
//! acts on (store, cue runtime, media transport) and dispatches host events
//! into behavior actions. Condition watchers flush with deferred semantics:
//! invalidations queue during a dispatch and run as one batch afterwards.

use serde_json::json;
use tracing::{debug, warn};

use crate::behavior::compile::{Bytecode, CompiledAction, CompiledTrigger, Program, eval};
use crate::behavior::context::{BehaviorContext, ScriptValue};
use crate::behavior::reactivity::Reactivity;
use crate::cue::engine::CueRuntime;
use crate::cue::transport::{MediaController, MediaTransport};
use crate::eval::properties::{active, hidden};
use crate::foundation::error::{MetascoreError, MetascoreResult};
use crate::model::component::ComponentId;
use crate::store::tree::ComponentStore;

/// Command surfaced to the host/rendering layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCommand {
    /// Navigate to a URL.
    OpenUrl(String),
}

/// The mutable collaborators a behavior dispatch runs against.
pub struct World<'a> {
    /// The component tree.
    pub store: &'a mut ComponentStore,
    /// The cue-point runtime.
    pub cues: &'a mut CueRuntime,
    /// The ranged-playback controller.
    pub controller: &'a mut MediaController,
    /// The media transport and clock.
    pub media: &'a mut dyn MediaTransport,
    /// Outbox of commands for the host to execute.
    pub commands: &'a mut Vec<HostCommand>,
}

#[derive(Clone, Copy, Debug)]
struct ConditionWatch {
    unit: usize,
    last: bool,
}

/// Executes a compiled behavior program.
///
/// Lifecycle: [`BehaviorRuntime::on_startup`] installs watchers and runs
/// startup behaviors once; [`BehaviorRuntime::reset`] tears every watcher
/// down atomically and returns the runtime to its pre-startup state.
pub struct BehaviorRuntime {
    program: Program,
    ctx: BehaviorContext,
    watchers: Reactivity<ConditionWatch>,
    window_state: Vec<(usize, bool)>,
    started: bool,
}

impl BehaviorRuntime {
    /// Bind a compiled program to an execution context.
    pub fn new(program: Program, ctx: BehaviorContext) -> Self {
        Self {
            program,
            ctx,
            watchers: Reactivity::new(),
            window_state: Vec::new(),
            started: false,
        }
    }

    /// The execution context (variables, installed modules).
    pub fn context(&self) -> &BehaviorContext {
        &self.ctx
    }

    /// Number of live condition watchers.
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Install watchers and run startup behaviors. Idempotent until
    /// [`BehaviorRuntime::reset`].
    pub fn on_startup(&mut self, world: &mut World<'_>) {
        if self.started {
            return;
        }
        self.started = true;

        for (i, unit) in self.program.units.iter().enumerate() {
            match unit.trigger {
                CompiledTrigger::Condition(_) => {
                    self.watchers.watch(ConditionWatch {
                        unit: i,
                        last: false,
                    });
                }
                CompiledTrigger::TimeWindow(_) => {
                    self.window_state.push((i, false));
                }
                _ => {}
            }
        }

        for i in 0..self.program.units.len() {
            if matches!(self.program.units[i].trigger, CompiledTrigger::Startup) {
                Self::run_unit(&self.program, &mut self.ctx, world, i);
            }
        }
        self.flush(world);
    }

    /// Dispatch a click on a component.
    pub fn on_click(&mut self, world: &mut World<'_>, component: ComponentId) {
        for i in 0..self.program.units.len() {
            if matches!(self.program.units[i].trigger, CompiledTrigger::Click(c) if c == component)
            {
                Self::run_unit(&self.program, &mut self.ctx, world, i);
            }
        }
        self.watchers.invalidate_all();
    }

    /// Dispatch a key press.
    pub fn on_key(&mut self, world: &mut World<'_>, key: &str) {
        for i in 0..self.program.units.len() {
            let matches = match &self.program.units[i].trigger {
                CompiledTrigger::Key(k) => k == key,
                _ => false,
            };
            if matches {
                Self::run_unit(&self.program, &mut self.ctx, world, i);
            }
        }
        self.watchers.invalidate_all();
    }

    /// Dispatch a media time update.
    ///
    /// Drives the cue runtime, edge-detects time-window triggers, then
    /// re-runs condition watchers as one deferred batch.
    pub fn on_time_update(&mut self, world: &mut World<'_>) {
        world.cues.on_time_update(world.media);

        let time = world.media.current_time();
        for i in 0..self.window_state.len() {
            let (unit, was_active) = self.window_state[i];
            let CompiledTrigger::TimeWindow(component) = &self.program.units[unit].trigger else {
                continue;
            };
            let component = *component;
            let now_active = world
                .store
                .get(component)
                .is_some_and(|c| active(c, time));
            if now_active && !was_active {
                Self::run_unit(&self.program, &mut self.ctx, world, unit);
            }
            self.window_state[i].1 = now_active;
        }

        self.watchers.invalidate_all();
        self.flush(world);
    }

    /// Queue every condition watcher for re-evaluation after a model change.
    pub fn notify_data_changed(&mut self) {
        self.watchers.invalidate_all();
    }

    /// Run the pending watcher batch: each watcher re-evaluates its
    /// condition, firing its actions on a false-to-true transition.
    pub fn flush(&mut self, world: &mut World<'_>) {
        let pending = self.watchers.take_pending();
        for id in pending {
            let Some(watch) = self.watchers.payload_mut(id) else {
                continue;
            };
            let unit = watch.unit;
            let last = watch.last;

            let CompiledTrigger::Condition(bc) = &self.program.units[unit].trigger else {
                continue;
            };
            let now = match eval(bc, |n| self.ctx.variable(n).cloned(), world.media.current_time())
            {
                Ok(v) => v.truthy(),
                Err(err) => {
                    warn!(
                        behavior = %self.program.units[unit].id,
                        error = %err,
                        "condition evaluation failed"
                    );
                    false
                }
            };

            if now && !last {
                Self::run_unit(&self.program, &mut self.ctx, world, unit);
            }
            if let Some(watch) = self.watchers.payload_mut(id) {
                watch.last = now;
            }
        }
    }

    /// Tear down every registered watcher and listener atomically.
    ///
    /// Idempotent and safe with zero watchers; the runtime returns to its
    /// pre-startup state and can be started again.
    pub fn reset(&mut self) {
        self.watchers.reset();
        self.window_state.clear();
        self.ctx.clear_variables();
        self.started = false;
        debug!("behavior runtime reset");
    }

    fn run_unit(
        program: &Program,
        ctx: &mut BehaviorContext,
        world: &mut World<'_>,
        unit: usize,
    ) {
        let behavior = &program.units[unit];
        debug!(behavior = %behavior.id, "running behavior actions");
        for action in &behavior.actions {
            if let Err(err) = apply_action(action, ctx, world) {
                warn!(
                    behavior = %behavior.id,
                    error = %err,
                    "behavior action failed; continuing"
                );
            }
        }
    }
}

fn apply_action(
    action: &CompiledAction,
    ctx: &mut BehaviorContext,
    world: &mut World<'_>,
) -> MetascoreResult<()> {
    match action {
        CompiledAction::PlayMedia { from, to } => {
            world
                .controller
                .play(world.cues, world.media, *from, *to, None)
        }
        CompiledAction::PauseMedia => {
            world.controller.pause(world.media);
            Ok(())
        }
        CompiledAction::StopMedia => {
            world.controller.stop(world.cues, world.media);
            Ok(())
        }
        CompiledAction::SetMediaTime(time) => {
            world.media.seek(*time);
            Ok(())
        }
        CompiledAction::ShowComponent(id) => set_hidden(world, *id, false),
        CompiledAction::HideComponent(id) => set_hidden(world, *id, true),
        CompiledAction::ToggleComponent(id) => {
            let component = world
                .store
                .get(*id)
                .ok_or_else(|| MetascoreError::behavior(format!("unknown component {id}")))?;
            let current = hidden(component).ok_or_else(|| {
                MetascoreError::behavior(format!("component {id} is not hideable"))
            })?;
            set_hidden(world, *id, !current)
        }
        CompiledAction::OpenUrl(url) => {
            world.commands.push(HostCommand::OpenUrl(url.clone()));
            Ok(())
        }
        CompiledAction::SetVariable { name, value } => {
            let v = eval_in(value, ctx, world)?;
            ctx.set_variable(name.clone(), v)
        }
        CompiledAction::AppendToList { name, value } => {
            let v = eval_in(value, ctx, world)?;
            match ctx.variable(name).cloned() {
                None => ctx.set_variable(name.clone(), ScriptValue::List(vec![v])),
                Some(ScriptValue::List(mut items)) => {
                    items.push(v);
                    ctx.set_variable(name.clone(), ScriptValue::List(items))
                }
                Some(_) => Err(MetascoreError::behavior(format!(
                    "variable '{name}' is not a list"
                ))),
            }
        }
    }
}

fn eval_in(
    bc: &Bytecode,
    ctx: &BehaviorContext,
    world: &World<'_>,
) -> MetascoreResult<ScriptValue> {
    eval(bc, |n| ctx.variable(n).cloned(), world.media.current_time())
}

fn set_hidden(world: &mut World<'_>, id: ComponentId, value: bool) -> MetascoreResult<()> {
    world.store.update(id, json!({ "hidden": value }))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/behavior/runtime.rs"]
mod tests;

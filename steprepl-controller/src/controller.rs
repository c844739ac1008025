//! Step controller: the driver loop on the controlling thread
//!
//! The host calls [`StepController::tick`] once per frame. A tick looks at
//! the active task, renders a halt the first time it is seen, turns a
//! pending user command into a step mode plus a single resume, and forwards
//! output samples. Commands are plain method calls made from the same
//! thread between ticks.

use std::sync::Arc;
use steprepl_core::{Engine, Invocation, WorldState};
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::error::{ControllerError, Result};
use crate::gate::{StepCommand, StepMode};
use crate::task::{ExecutionLifecycle, ExecutionTask, TaskId, TaskOutcome};
use crate::view::{HaltReport, View, ViewUpdate};

/// What a tick found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// No program is active
    Idle,
    /// The active program is running
    Running,
    /// The active program is halted, waiting for a command
    Halted,
    /// The active program ended during this tick
    Finished,
}

struct ActiveTask {
    task: ExecutionTask,
    code: String,
    /// Halt most recently rendered; 0 before the first
    rendered_seq: u64,
    pending: Option<StepCommand>,
}

impl ActiveTask {
    fn awaiting_command(&self) -> bool {
        self.rendered_seq != 0
            && self.task.lifecycle() == ExecutionLifecycle::Suspended
            && self.task.halt_seq() == self.rendered_seq
    }
}

/// Drives at most one execution task at a time
pub struct StepController {
    engine: Arc<dyn Engine>,
    config: ControllerConfig,
    active: Option<ActiveTask>,
    state: WorldState,
}

impl StepController {
    pub fn new(engine: Arc<dyn Engine>, config: ControllerConfig) -> Self {
        Self {
            engine,
            config,
            active: None,
            state: WorldState::new(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// World state the next run starts from
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn set_state(&mut self, state: WorldState) {
        self.state = state;
    }

    /// Id of the active task
    pub fn active_task(&self) -> Option<TaskId> {
        self.active.as_ref().map(|a| a.task.id())
    }

    /// Lifecycle of the active task
    pub fn lifecycle(&self) -> Option<ExecutionLifecycle> {
        self.active.as_ref().map(|a| a.task.lifecycle())
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether a halt has been displayed and is waiting for a command
    pub fn is_awaiting_command(&self) -> bool {
        self.active.as_ref().map_or(false, ActiveTask::awaiting_command)
    }

    /// Start a run without single-stepping
    pub fn start(&mut self, code: impl Into<String>, view: &mut dyn View) -> Result<TaskId> {
        self.start_with(code.into(), StepMode::Run, view)
    }

    /// Start a run that halts at its first trace event
    pub fn start_stepping(&mut self, code: impl Into<String>, view: &mut dyn View) -> Result<TaskId> {
        self.start_with(code.into(), StepMode::StepInto, view)
    }

    fn start_with(&mut self, code: String, mode: StepMode, view: &mut dyn View) -> Result<TaskId> {
        // The previous run is aborted, and shown as such, before the new
        // one can halt.
        self.abort(view);

        let invocation = Invocation::new(code.clone(), self.state.clone());
        let task = ExecutionTask::start(Arc::clone(&self.engine), invocation, mode, &self.config)?;
        let id = task.id();
        info!(task = id, code = %code, "started run");
        view.render(ViewUpdate::Started {
            task: id,
            code: code.clone(),
        });
        self.active = Some(ActiveTask {
            task,
            code,
            rendered_seq: 0,
            pending: None,
        });
        Ok(id)
    }

    pub fn step_into(&mut self) -> Result<()> {
        self.command(StepCommand::StepInto)
    }

    pub fn step_over(&mut self) -> Result<()> {
        self.command(StepCommand::StepOver)
    }

    pub fn step_out(&mut self) -> Result<()> {
        self.command(StepCommand::StepOut)
    }

    pub fn continue_run(&mut self) -> Result<()> {
        self.command(StepCommand::Continue)
    }

    /// Queue `command` for the displayed halt; it takes effect on the next
    /// tick. Only one command is accepted per halt.
    pub fn command(&mut self, command: StepCommand) -> Result<()> {
        let active = self.active.as_mut().ok_or(ControllerError::NoActiveTask)?;
        if !active.awaiting_command() {
            return Err(ControllerError::NotHalted);
        }
        if active.pending.is_some() {
            return Err(ControllerError::CommandPending);
        }
        debug!(task = active.task.id(), ?command, "command queued");
        active.pending = Some(command);
        Ok(())
    }

    /// Make a running program halt at its next trace event. A program that
    /// is already halted stays where it is.
    pub fn interrupt(&mut self) -> Result<()> {
        let active = self.active.as_ref().ok_or(ControllerError::NoActiveTask)?;
        if active.task.request_interrupt() {
            debug!(task = active.task.id(), "interrupt requested");
            return Ok(());
        }
        match active.task.lifecycle() {
            ExecutionLifecycle::Suspended => Ok(()),
            // Ended on its own; the next tick reports how.
            _ => Err(ControllerError::NoActiveTask),
        }
    }

    /// Cancel the active run, if any. Returns whether there was one.
    pub fn abort(&mut self, view: &mut dyn View) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        let id = active.task.id();
        if active.task.cancel() {
            info!(task = id, code = %active.code, "run aborted");
            view.render(ViewUpdate::Aborted { task: id });
        } else {
            // It finished before we got to it; report the real ending.
            self.render_outcome(&active, view);
        }
        true
    }

    /// Show the world state: the halted run's when halted, otherwise the
    /// state the next run would start from. Read-only; never resumes.
    pub fn dump_state(&self, view: &mut dyn View) -> Result<()> {
        let state = match &self.active {
            None => self.state.clone(),
            Some(active) => {
                if !active.awaiting_command() {
                    return Err(ControllerError::NotHalted);
                }
                active.task.snapshot().ok_or(ControllerError::NotHalted)?.state
            }
        };
        let vars = state.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        view.render(ViewUpdate::StateDump(vars));
        Ok(())
    }

    /// One pass of the driver loop
    pub fn tick(&mut self, view: &mut dyn View) -> TickStatus {
        let Some(active) = self.active.as_mut() else {
            return TickStatus::Idle;
        };

        match active.task.lifecycle() {
            ExecutionLifecycle::Completed | ExecutionLifecycle::Aborted => {
                if let Some(active) = self.active.take() {
                    self.render_outcome(&active, view);
                }
                TickStatus::Finished
            }
            ExecutionLifecycle::Suspended => {
                let Some(snapshot) = active.task.snapshot() else {
                    return TickStatus::Running;
                };

                if snapshot.halt_seq != active.rendered_seq {
                    if let Some(sample) = active.task.take_sample() {
                        view.render(ViewUpdate::Sample { text: sample.text });
                    }
                    let report = HaltReport::from_snapshot(active.task.id(), &snapshot);
                    active.rendered_seq = snapshot.halt_seq;
                    active.pending = None;
                    view.render(ViewUpdate::Halted(report));
                    return TickStatus::Halted;
                }

                let Some(command) = active.pending.take() else {
                    return TickStatus::Halted;
                };
                let mode = command.next_mode(snapshot.trace_event, snapshot.frame.as_ref());
                drop(snapshot);

                active.task.set_step_mode(mode);
                if active.task.resume(active.rendered_seq) {
                    debug!(task = active.task.id(), ?command, ?mode, "resumed");
                    view.render(ViewUpdate::Resumed { command });
                    TickStatus::Running
                } else {
                    TickStatus::Halted
                }
            }
            ExecutionLifecycle::Running => {
                if let Some(sample) = active.task.take_sample() {
                    view.render(ViewUpdate::Sample { text: sample.text });
                }
                TickStatus::Running
            }
        }
    }

    fn render_outcome(&mut self, active: &ActiveTask, view: &mut dyn View) {
        let id = active.task.id();
        match active.task.outcome() {
            Some(TaskOutcome::Finished(completion)) => {
                info!(task = id, "run finished");
                if self.config.retain_state {
                    self.state = completion.state;
                }
                view.render(ViewUpdate::Finished { text: completion.text });
            }
            Some(TaskOutcome::Faulted(err)) => {
                info!(task = id, error = %err, "run faulted");
                view.render(ViewUpdate::Faulted {
                    message: err.to_string(),
                    stack: err.stack().to_vec(),
                });
            }
            Some(TaskOutcome::Aborted) | None => view.render(ViewUpdate::Aborted { task: id }),
        }
    }
}

impl Drop for StepController {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.cancel();
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;

//! Execution tasks: one interpreter invocation on its own worker thread
//!
//! The worker and the controlling thread meet at a single rendezvous. The
//! worker publishes an [`ExecutionSnapshot`] and blocks on a condition
//! variable; the controller observes `Suspended`, reads the snapshot and
//! later releases the worker with [`ExecutionTask::resume`]. Nothing else
//! about the interpreter is shared between the two threads.
//!
//! Cancellation is cooperative: [`ExecutionTask::cancel`] marks the task
//! `Aborted` at once and raises a flag that the worker sees at its next
//! trace event, explicit break, or checkpoint, where it unwinds back to the
//! invocation boundary. An engine stuck in a long step that never reaches
//! any of those keeps its thread busy until it does; shared state the
//! engine was mutating at the time is left as it was.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use steprepl_core::{
    Binding, Completion, Engine, EngineError, EngineResult, Environment, ExecutionContext,
    FrameRef, Interrupt, Invocation, TraceEvent, WorldState,
};
use tracing::{debug, trace, warn};

use crate::config::ControllerConfig;
use crate::error::Result;
use crate::gate::{StepMode, TraceGate};

/// Identifier of an execution task
pub type TaskId = u64;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of an execution task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionLifecycle {
    Running,
    Suspended,
    Completed,
    Aborted,
}

impl ExecutionLifecycle {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionLifecycle::Completed | ExecutionLifecycle::Aborted)
    }

    /// Running or suspended
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// What the worker published right before halting
#[derive(Debug, Clone)]
pub struct ExecutionSnapshot {
    /// Output produced so far
    pub text: String,
    /// World state at the halt
    pub state: WorldState,
    /// Trace event that caused the halt; `None` for explicit breaks
    pub trace_event: TraceEvent,
    /// Message given to an explicit break
    pub break_message: Option<String>,
    /// Whether the call stack should be displayed
    pub show_stack: bool,
    /// The halted call, when known
    pub frame: Option<FrameRef>,
    /// Local bindings of the halted call
    pub bindings: Vec<Binding>,
    /// Increases by one with every halt of the task
    pub halt_seq: u64,
}

/// Output published by the sampling builtin while the task keeps running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSample {
    pub text: String,
    pub state: WorldState,
}

/// How a finished task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The invocation returned
    Finished(Completion),
    /// The invocation failed; prior output is not part of the fault
    Faulted(EngineError),
    /// The controller cancelled the task
    Aborted,
}

struct TaskInner {
    lifecycle: ExecutionLifecycle,
    mode: StepMode,
    halt_seq: u64,
    snapshot: Option<ExecutionSnapshot>,
    sample: Option<OutputSample>,
    outcome: Option<TaskOutcome>,
}

/// State shared between the task handle and its worker
struct TaskShared {
    id: TaskId,
    inner: Mutex<TaskInner>,
    released: Condvar,
    cancelled: AtomicBool,
}

impl TaskShared {
    /// Publish `snapshot` and block until resumed or cancelled.
    ///
    /// Takes the lock guard so the decision to halt and the halt itself
    /// happen under the same lock.
    fn halt(&self, mut inner: MutexGuard<'_, TaskInner>, mut snapshot: ExecutionSnapshot) -> std::result::Result<(), Interrupt> {
        if inner.lifecycle.is_terminal() {
            return Err(Interrupt);
        }

        inner.halt_seq += 1;
        snapshot.halt_seq = inner.halt_seq;
        trace!(task = self.id, halt = inner.halt_seq, event = ?snapshot.trace_event, "worker halting");
        inner.snapshot = Some(snapshot);
        inner.lifecycle = ExecutionLifecycle::Suspended;

        while inner.lifecycle == ExecutionLifecycle::Suspended {
            self.released.wait(&mut inner);
        }

        // Drop the frame before running on so it can be recycled.
        inner.snapshot = None;
        match inner.lifecycle {
            ExecutionLifecycle::Aborted => Err(Interrupt),
            _ => Ok(()),
        }
    }

    fn finish(&self, result: EngineResult<Completion>) {
        let mut inner = self.inner.lock();
        if inner.lifecycle == ExecutionLifecycle::Aborted {
            debug!(task = self.id, "worker unwound after cancellation");
            return;
        }
        let outcome = match result {
            Ok(completion) => TaskOutcome::Finished(completion),
            Err(err) => {
                debug!(task = self.id, error = %err, "invocation faulted");
                TaskOutcome::Faulted(err)
            }
        };
        inner.outcome = Some(outcome);
        inner.lifecycle = ExecutionLifecycle::Completed;
        inner.snapshot = None;
        debug!(task = self.id, "invocation completed");
    }
}

/// The context handed to the engine; its route back to the running task
pub struct TaskContext {
    shared: Arc<TaskShared>,
    gate: TraceGate,
}

impl TaskContext {
    fn check_cancelled(&self) -> std::result::Result<(), Interrupt> {
        if self.shared.cancelled.load(Ordering::Acquire) {
            Err(Interrupt)
        } else {
            Ok(())
        }
    }

    fn request_halt(
        &self,
        inner: MutexGuard<'_, TaskInner>,
        trace_event: TraceEvent,
        break_message: Option<String>,
        show_stack: bool,
        output: &str,
        env: &Environment,
        frame: Option<&FrameRef>,
    ) -> std::result::Result<(), Interrupt> {
        let snapshot = ExecutionSnapshot {
            text: output.to_string(),
            state: env.state.clone(),
            trace_event,
            break_message,
            show_stack,
            frame: frame.cloned(),
            bindings: env.bindings.clone(),
            halt_seq: 0,
        };
        self.shared.halt(inner, snapshot)
    }
}

impl ExecutionContext for TaskContext {
    fn trace(
        &self,
        event: TraceEvent,
        frame: &FrameRef,
        output: &str,
        env: &Environment,
    ) -> std::result::Result<(), Interrupt> {
        self.check_cancelled()?;
        let inner = self.shared.inner.lock();
        if !self.gate.should_halt(inner.mode, event, frame) {
            return Ok(());
        }
        self.request_halt(inner, event, None, true, output, env, Some(frame))
    }

    fn pause(&self, output: &str, env: &Environment, frame: Option<&FrameRef>) -> std::result::Result<(), Interrupt> {
        self.check_cancelled()?;
        let inner = self.shared.inner.lock();
        let show_stack = inner.mode.is_single_step();
        self.request_halt(inner, TraceEvent::None, None, show_stack, output, env, frame)
    }

    fn break_here(
        &self,
        message: Option<String>,
        output: &str,
        env: &Environment,
        frame: Option<&FrameRef>,
    ) -> std::result::Result<(), Interrupt> {
        self.check_cancelled()?;
        let inner = self.shared.inner.lock();
        self.request_halt(inner, TraceEvent::None, message, true, output, env, frame)
    }

    fn sample_output(&self, output: &str, state: &WorldState) {
        let mut inner = self.shared.inner.lock();
        if inner.sample.is_none() && inner.lifecycle == ExecutionLifecycle::Running {
            inner.sample = Some(OutputSample {
                text: output.to_string(),
                state: state.clone(),
            });
        }
    }

    fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }
}

/// One interpreter invocation running on its own worker thread
pub struct ExecutionTask {
    shared: Arc<TaskShared>,
    worker: Option<JoinHandle<()>>,
}

impl ExecutionTask {
    /// Spawn the worker and start the invocation; returns immediately
    pub fn start(
        engine: Arc<dyn Engine>,
        invocation: Invocation,
        mode: StepMode,
        config: &ControllerConfig,
    ) -> Result<Self> {
        let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(TaskShared {
            id,
            inner: Mutex::new(TaskInner {
                lifecycle: ExecutionLifecycle::Running,
                mode,
                halt_seq: 0,
                snapshot: None,
                sample: None,
                outcome: None,
            }),
            released: Condvar::new(),
            cancelled: AtomicBool::new(false),
        });

        let mut builder = thread::Builder::new().name(format!("{}-{}", config.thread_name, id));
        if let Some(stack_size) = config.stack_size.max(engine.stack_size_hint()) {
            builder = builder.stack_size(stack_size);
        }

        let ctx = TaskContext {
            shared: Arc::clone(&shared),
            gate: TraceGate::new(config.boundary),
        };
        debug!(task = id, code = %invocation.code, ?mode, "starting invocation");
        let worker = builder.spawn(move || run_worker(engine, invocation, ctx))?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    pub fn id(&self) -> TaskId {
        self.shared.id
    }

    pub fn lifecycle(&self) -> ExecutionLifecycle {
        self.shared.inner.lock().lifecycle
    }

    /// Sequence number of the most recent halt; 0 before the first halt
    pub fn halt_seq(&self) -> u64 {
        self.shared.inner.lock().halt_seq
    }

    /// The published snapshot, only while the task is suspended
    pub fn snapshot(&self) -> Option<ExecutionSnapshot> {
        let inner = self.shared.inner.lock();
        match inner.lifecycle {
            ExecutionLifecycle::Suspended => inner.snapshot.clone(),
            _ => None,
        }
    }

    /// Take the pending output sample, clearing the flag
    pub fn take_sample(&self) -> Option<OutputSample> {
        self.shared.inner.lock().sample.take()
    }

    pub fn step_mode(&self) -> StepMode {
        self.shared.inner.lock().mode
    }

    /// Change how trace events are treated once the worker runs again
    pub fn set_step_mode(&self, mode: StepMode) {
        self.shared.inner.lock().mode = mode;
    }

    /// Make the next trace event halt a running task
    pub fn request_interrupt(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.lifecycle != ExecutionLifecycle::Running {
            return false;
        }
        inner.mode = StepMode::StepInto;
        true
    }

    /// Release the worker from the halt numbered `halt_seq`.
    ///
    /// Returns `false`, doing nothing, unless the task is suspended at
    /// exactly that halt.
    pub fn resume(&self, halt_seq: u64) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.lifecycle != ExecutionLifecycle::Suspended || inner.halt_seq != halt_seq {
            warn!(task = self.shared.id, halt_seq, current = inner.halt_seq, lifecycle = ?inner.lifecycle, "ignored resume");
            return false;
        }
        inner.lifecycle = ExecutionLifecycle::Running;
        inner.snapshot = None;
        self.shared.released.notify_all();
        trace!(task = self.shared.id, halt_seq, "worker resumed");
        true
    }

    /// Cancel the task. It is `Aborted` when this returns; the worker
    /// unwinds at its next cancellation point.
    pub fn cancel(&self) -> bool {
        self.shared.cancelled.store(true, Ordering::Release);
        let mut inner = self.shared.inner.lock();
        if inner.lifecycle.is_terminal() {
            return false;
        }
        inner.lifecycle = ExecutionLifecycle::Aborted;
        inner.outcome = Some(TaskOutcome::Aborted);
        inner.snapshot = None;
        inner.sample = None;
        self.shared.released.notify_all();
        debug!(task = self.shared.id, "task cancelled");
        true
    }

    /// How the task ended, once terminal
    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.shared.inner.lock().outcome.clone()
    }

    /// Output text of a completed task; `None` while running, after a
    /// fault, or after cancellation
    pub fn text(&self) -> Option<String> {
        match self.outcome()? {
            TaskOutcome::Finished(completion) => Some(completion.text),
            _ => None,
        }
    }

    /// The fault a completed task ended with
    pub fn fault(&self) -> Option<EngineError> {
        match self.outcome()? {
            TaskOutcome::Faulted(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the worker thread has exited
    pub fn is_worker_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker thread to exit
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(task = self.shared.id, "worker thread panicked outside the invocation");
            }
        }
    }
}

impl Drop for ExecutionTask {
    fn drop(&mut self) {
        // Never leave a worker blocked at a halt nobody will release.
        self.cancel();
    }
}

impl std::fmt::Debug for ExecutionTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionTask")
            .field("id", &self.shared.id)
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

fn run_worker(engine: Arc<dyn Engine>, invocation: Invocation, ctx: TaskContext) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| engine.execute(invocation, &ctx)))
        .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(payload.as_ref()))));
    ctx.shared.finish(result);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;

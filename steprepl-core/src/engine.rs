//! Interpreter invocation contract
//!
//! An [`Engine`] is the external interpreter. It is invoked once per program
//! run, on the controller's worker thread, and reports its progress through
//! the [`ExecutionContext`] it is handed. The context is the engine's only
//! route back to the task that is running it: the trace hook, the explicit
//! break and pause builtins, and output sampling all go through it.

use crate::error::{EngineResult, Interrupt};
use crate::frame::FrameRef;
use crate::state::{Environment, WorldState};
use crate::trace::TraceEvent;

/// A program fragment to run and the world state to run it in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub code: String,
    pub state: WorldState,
}

impl Invocation {
    pub fn new(code: impl Into<String>, state: WorldState) -> Self {
        Self {
            code: code.into(),
            state,
        }
    }
}

/// Successful result of an invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Output text produced by the run
    pub text: String,
    /// World state at the end of the run
    pub state: WorldState,
}

/// Callbacks available to a running engine.
///
/// Every method is called synchronously on the worker thread. Methods that
/// may halt return [`Interrupt`] when the run was cancelled; engines
/// propagate it with `?` so the worker unwinds to the invocation boundary.
pub trait ExecutionContext: Send + Sync {
    /// Trace hook, called when a call is entered, a method succeeds, a
    /// method fails, or a call fails outright. May block until resumed.
    fn trace(
        &self,
        event: TraceEvent,
        frame: &FrameRef,
        output: &str,
        env: &Environment,
    ) -> Result<(), Interrupt>;

    /// Halt unconditionally. The call stack is shown only when the run is
    /// being single-stepped.
    fn pause(&self, output: &str, env: &Environment, frame: Option<&FrameRef>) -> Result<(), Interrupt>;

    /// Halt unconditionally with an optional message, always showing the
    /// call stack.
    fn break_here(
        &self,
        message: Option<String>,
        output: &str,
        env: &Environment,
        frame: Option<&FrameRef>,
    ) -> Result<(), Interrupt>;

    /// Publish the current output without halting. Ignored while the
    /// previous sample has not been displayed.
    fn sample_output(&self, output: &str, state: &WorldState);

    /// Whether the run has been cancelled
    fn is_cancelled(&self) -> bool;

    /// Cancellation point for long-running engine work
    fn checkpoint(&self) -> Result<(), Interrupt> {
        if self.is_cancelled() {
            Err(Interrupt)
        } else {
            Ok(())
        }
    }
}

/// The external interpreter
pub trait Engine: Send + Sync + 'static {
    /// Run one invocation to completion
    fn execute(&self, invocation: Invocation, ctx: &dyn ExecutionContext) -> EngineResult<Completion>;

    /// Worker stack size, in bytes, the engine needs for its deepest
    /// allowed recursion. The controller never starts a worker with less.
    fn stack_size_hint(&self) -> Option<usize> {
        None
    }
}

/// Context for runs with no controller attached: never halts, never
/// cancels, drops samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unattended;

impl ExecutionContext for Unattended {
    fn trace(&self, _: TraceEvent, _: &FrameRef, _: &str, _: &Environment) -> Result<(), Interrupt> {
        Ok(())
    }

    fn pause(&self, _: &str, _: &Environment, _: Option<&FrameRef>) -> Result<(), Interrupt> {
        Ok(())
    }

    fn break_here(
        &self,
        _: Option<String>,
        _: &str,
        _: &Environment,
        _: Option<&FrameRef>,
    ) -> Result<(), Interrupt> {
        Ok(())
    }

    fn sample_output(&self, _: &str, _: &WorldState) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

//! Trace gate: decides which trace events halt the worker
//!
//! The gate is consulted synchronously on the worker for every
//! `(TraceEvent, CallFrame)` pair the interpreter reports. What it does
//! depends on the current [`StepMode`], which the controller changes only
//! while the worker is halted (or, for an interrupt, while it runs).
//!
//! Step targets are stored as stack levels (see [`level_of`]) rather than
//! frames, so a pending step-over never keeps an interpreter frame alive.

use crate::config::DepthBoundary;
use steprepl_core::{level_of, FrameRef, TraceEvent};

/// How the gate treats trace events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepMode {
    /// Gate detached; only explicit breaks halt
    #[default]
    Run,
    /// Halt on every trace event
    StepInto,
    /// Run freely until a call returns to `level` or above
    StepUntil { level: usize },
}

impl StepMode {
    /// Whether trace events are being looked at at all
    pub fn is_single_step(self) -> bool {
        !matches!(self, StepMode::Run)
    }
}

/// A debugger command that resumes a halted run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand {
    /// Halt at the very next trace event
    StepInto,
    /// Halt once the halted call returns
    StepOver,
    /// Halt once the halted call and its caller return
    StepOut,
    /// Run without halting on trace events
    Continue,
}

impl StepCommand {
    /// The step mode to resume with, given where the run is halted
    pub fn next_mode(self, event: TraceEvent, frame: Option<&FrameRef>) -> StepMode {
        match (self, frame) {
            (StepCommand::Continue, _) => StepMode::Run,
            (StepCommand::StepInto, _) | (_, None) => StepMode::StepInto,
            // The halted call already finished; there is nothing to step over.
            (StepCommand::StepOver, Some(_)) if event.ends_call() => StepMode::StepInto,
            (StepCommand::StepOver, Some(frame)) => StepMode::StepUntil {
                level: level_of(frame.caller().as_ref()),
            },
            (StepCommand::StepOut, Some(frame)) => StepMode::StepUntil {
                level: level_of(frame.caller().and_then(|caller| caller.caller()).as_ref()),
            },
        }
    }
}

/// The halting decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceGate {
    boundary: DepthBoundary,
}

impl TraceGate {
    pub fn new(boundary: DepthBoundary) -> Self {
        Self { boundary }
    }

    pub fn boundary(&self) -> DepthBoundary {
        self.boundary
    }

    /// Whether `event` reported by `frame` halts the worker under `mode`
    pub fn should_halt(&self, mode: StepMode, event: TraceEvent, frame: &FrameRef) -> bool {
        if event == TraceEvent::None {
            return false;
        }
        match mode {
            StepMode::Run => false,
            StepMode::StepInto => true,
            StepMode::StepUntil { level } => {
                event.ends_call() && self.boundary.reached(level_of(frame.caller().as_ref()), level)
            }
        }
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;

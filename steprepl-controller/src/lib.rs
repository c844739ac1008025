//! StepRepl execution controller
//!
//! Runs interpreter invocations on a worker thread and lets a controlling
//! thread single-step them: halt at trace events, step into, over and out
//! of calls, continue, and abort.

pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod queue;
pub mod task;
pub mod view;

pub use config::{ControllerConfig, DepthBoundary};
pub use controller::{StepController, TickStatus};
pub use error::{ControllerError, Result};
pub use gate::{StepCommand, StepMode, TraceGate};
pub use queue::{DeferredAction, DeferredQueue, DeferredSender};
pub use task::{
    ExecutionLifecycle, ExecutionSnapshot, ExecutionTask, OutputSample, TaskContext, TaskId,
    TaskOutcome,
};
pub use view::{HaltHeadline, HaltReport, View, ViewUpdate};

#[cfg(test)]
mod test_support;

//! Core types shared between the StepRepl execution controller and the
//! interpreters it drives
//!
//! This crate describes the boundary with an external interpreter:
//! - Call frames reported at every trace event
//! - Trace event classification
//! - World state and binding environments
//! - The engine invocation contract and the execution context handed to it
//! - Error types

pub mod engine;
pub mod error;
pub mod frame;
pub mod state;
pub mod trace;

pub use engine::{Completion, Engine, ExecutionContext, Invocation, Unattended};
pub use error::{EngineError, EngineResult, Interrupt};
pub use frame::{level_of, CallFrame, FrameRef};
pub use state::{Binding, Environment, WorldState};
pub use trace::TraceEvent;

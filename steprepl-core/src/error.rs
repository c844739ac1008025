//! Error types for interpreter invocations

use std::fmt;
use thiserror::Error;

/// Result type for engine invocations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors an invocation can end with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The controller cancelled the invocation
    #[error("Aborted")]
    Cancelled,

    /// The interpreted program raised a fault
    #[error("{message}")]
    Fault {
        /// Message shown to the user
        message: String,
        /// Best-effort call stack, innermost call first
        stack: Vec<String>,
    },

    /// The program text could not be read
    #[error("Parse error: {0}")]
    Parse(String),

    /// A call named a task that is not defined
    #[error("Unknown task: {name}")]
    UnknownTask {
        name: String,
        /// Call stack of the caller, innermost call first
        stack: Vec<String>,
    },

    /// The engine panicked; caught at the invocation boundary
    #[error("Interpreter panicked: {0}")]
    Panicked(String),
}

impl EngineError {
    /// Build a fault without stack information
    pub fn fault(message: impl Into<String>) -> Self {
        EngineError::Fault {
            message: message.into(),
            stack: Vec::new(),
        }
    }

    /// Whether this error is the result of cancellation rather than a fault
    pub fn is_cancellation(&self) -> bool {
        matches!(self, EngineError::Cancelled)
    }

    /// Call stack captured with the error, if any
    pub fn stack(&self) -> &[String] {
        match self {
            EngineError::Fault { stack, .. } | EngineError::UnknownTask { stack, .. } => stack,
            _ => &[],
        }
    }
}

/// Returned by the execution context when the worker has to unwind.
///
/// Engines propagate it with `?`; it converts into [`EngineError::Cancelled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupt;

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "execution cancelled")
    }
}

impl std::error::Error for Interrupt {}

impl From<Interrupt> for EngineError {
    fn from(_: Interrupt) -> Self {
        EngineError::Cancelled
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

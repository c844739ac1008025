//! Controller error types

use thiserror::Error;

/// Result type for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Errors returned by the controller's command surface
#[derive(Error, Debug)]
pub enum ControllerError {
    /// A command needs a running program
    #[error("No program is running")]
    NoActiveTask,

    /// A step command was issued while execution was not halted
    #[error("Execution is not halted")]
    NotHalted,

    /// A step command was already issued for the current halt
    #[error("A command is already pending for this halt")]
    CommandPending,

    /// The worker thread could not be started
    #[error("Failed to spawn worker thread: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

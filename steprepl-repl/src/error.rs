//! Error types for the REPL

use steprepl_controller::ControllerError;
use steprepl_core::EngineError;
use thiserror::Error;

/// Result type for REPL operations
pub type ReplResult<T> = Result<T, ReplError>;

/// Errors that can occur in the REPL
#[derive(Debug, Error)]
pub enum ReplError {
    /// Bad command or command usage
    #[error("{0}")]
    Command(String),

    /// Configuration problem
    #[error("Config error: {0}")]
    Config(String),

    /// Config file did not parse
    #[error("Config error: {0}")]
    ConfigSyntax(#[from] toml::de::Error),

    /// Line editor failure
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// A debugger command was not accepted
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// The program file did not load
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

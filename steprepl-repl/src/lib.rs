//! StepRepl interactive REPL
//!
//! Runs calls against a loaded program and lets the user step through them
//! one call event at a time. Input is read on its own thread so a running
//! program can be interrupted or aborted from the prompt.

pub mod commands;
pub mod config;
pub mod error;
pub mod repl;
pub mod terminal;

pub use commands::{CommandInfo, ReplCommand, COMMANDS};
pub use config::{load_config, ReplConfig};
pub use error::{ReplError, ReplResult};
pub use repl::Repl;
pub use terminal::TerminalView;

// Re-export key dependencies
pub use rustyline;

//! StepRepl script engine
//!
//! A small bracket-call language used as the interpreter behind the REPL.
//! Programs define tasks as lists of alternative methods; running code
//! reports every call to the execution context so it can be single-stepped.

pub mod ast;
pub mod builtins;
pub mod frame;
pub mod interpreter;
pub mod lexer;
pub mod parser;

pub use ast::{Arg, Body, Element, Method, Program};
pub use builtins::Builtin;
pub use frame::ScriptFrame;
pub use interpreter::{ScriptEngine, ScriptOptions};
pub use parser::{parse_body, parse_program};

//! Script interpreter
//!
//! Runs invocation code against the loaded program, reporting every task
//! call to the execution context: `Enter` when a call starts, `Succeed`
//! when one of its methods completes, `MethodFail` when a method fails and
//! another remains to be tried, and `CallFail` when every method failed.
//! A failed method's output and state changes are rolled back before the
//! next method runs.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use steprepl_core::{
    Binding, Completion, Engine, EngineError, EngineResult, Environment, ExecutionContext,
    FrameRef, Invocation, TraceEvent, Unattended, WorldState,
};
use tracing::{debug, trace};

use crate::ast::{Arg, Element, Program};
use crate::builtins::Builtin;
use crate::frame::ScriptFrame;
use crate::parser::{parse_body, parse_program};

/// Worker stack reserved per level of task nesting. Unoptimized builds
/// use a few KiB per level.
const STACK_PER_LEVEL: usize = 16 * 1024;
const STACK_BASE: usize = 1024 * 1024;

/// Interpreter options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    /// Maximum depth of nested task calls
    pub max_depth: usize,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self { max_depth: 500 }
    }
}

impl ScriptOptions {
    /// Largest accepted `max_depth`
    pub const DEPTH_LIMIT: usize = 20_000;

    /// Check the options before they are used
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_depth == 0 || self.max_depth > Self::DEPTH_LIMIT {
            return Err(EngineError::fault(format!(
                "max_depth must be between 1 and {}, got {}",
                Self::DEPTH_LIMIT,
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Stack a thread needs to reach `max_depth` without overflowing
    pub fn stack_size(&self) -> usize {
        STACK_BASE + self.max_depth.min(Self::DEPTH_LIMIT) * STACK_PER_LEVEL
    }
}

/// The script engine. The program can be replaced between runs; a run
/// keeps the program it started with.
#[derive(Debug, Default)]
pub struct ScriptEngine {
    program: RwLock<Arc<Program>>,
    options: ScriptOptions,
}

impl ScriptEngine {
    pub fn new(program: Program) -> Self {
        Self::with_options(program, ScriptOptions::default())
    }

    pub fn with_options(program: Program, options: ScriptOptions) -> Self {
        Self {
            program: RwLock::new(Arc::new(program)),
            options,
        }
    }

    pub fn from_source(source: &str) -> EngineResult<Self> {
        Ok(Self::new(parse_program(source)?))
    }

    /// Replace the program with `source`; keeps the old one if it does not
    /// parse. Returns the number of tasks defined.
    pub fn load(&self, source: &str) -> EngineResult<usize> {
        let program = parse_program(source)?;
        let count = program.task_count();
        *self.program.write() = Arc::new(program);
        debug!(tasks = count, "program loaded");
        Ok(count)
    }

    pub fn program(&self) -> Arc<Program> {
        Arc::clone(&self.program.read())
    }

    pub fn options(&self) -> &ScriptOptions {
        &self.options
    }

    /// Run `code` with no controller attached
    pub fn run(&self, code: &str, state: WorldState) -> EngineResult<Completion> {
        self.execute(Invocation::new(code, state), &Unattended)
    }
}

impl Engine for ScriptEngine {
    fn execute(&self, invocation: Invocation, ctx: &dyn ExecutionContext) -> EngineResult<Completion> {
        let body = parse_body(&invocation.code)?;
        let program = self.program();
        let mut run = Run {
            program: &program,
            ctx,
            max_depth: self.options.max_depth,
            output: String::new(),
            state: invocation.state,
        };

        if !run.body(&body, None, &[])? {
            return Err(EngineError::fault(format!("{} failed", abbreviate(&invocation.code))));
        }
        Ok(Completion {
            text: run.output,
            state: run.state,
        })
    }

    fn stack_size_hint(&self) -> Option<usize> {
        Some(self.options.stack_size())
    }
}

/// State of one invocation
struct Run<'p> {
    program: &'p Program,
    ctx: &'p dyn ExecutionContext,
    max_depth: usize,
    output: String,
    state: WorldState,
}

impl<'p> Run<'p> {
    /// Run `body`; `Ok(false)` when a call in it failed
    fn body(&mut self, body: &[Element], frame: Option<&FrameRef>, scope: &[Binding]) -> EngineResult<bool> {
        for element in body {
            match element {
                Element::Word(word) => append_word(&mut self.output, word),
                Element::Var(name) => {
                    let value = lookup(scope, name, frame)?;
                    append_word(&mut self.output, &value);
                }
                Element::Call { task, args } => {
                    let args = args
                        .iter()
                        .map(|arg| match arg {
                            Arg::Word(w) => Ok(w.clone()),
                            Arg::Var(v) => lookup(scope, v, frame),
                        })
                        .collect::<EngineResult<Vec<_>>>()?;
                    if !self.call(task, args, frame, scope)? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    fn call(&mut self, task: &str, args: Vec<String>, caller: Option<&FrameRef>, scope: &[Binding]) -> EngineResult<bool> {
        self.ctx.checkpoint()?;
        if let Some(builtin) = Builtin::from_name(task) {
            return self.builtin(builtin, args, caller, scope);
        }

        let program = self.program;
        let methods = program.methods(task).ok_or_else(|| EngineError::UnknownTask {
            name: task.to_string(),
            stack: caller.map(|f| f.ancestry()).unwrap_or_default(),
        })?;
        let depth = caller.map_or(0, |c| c.depth() + 1);
        if depth >= self.max_depth {
            return Err(fault_at("Maximum call depth exceeded", caller));
        }

        let frame = ScriptFrame::new(task, args.clone(), caller);
        self.trace(TraceEvent::Enter, &frame, &[])?;

        let candidates: Vec<_> = methods.iter().filter(|m| m.accepts(args.len())).collect();
        for (i, method) in candidates.iter().enumerate() {
            let bindings = bind(&method.params, &args);
            let saved_output = self.output.clone();
            let saved_state = self.state.clone();

            if self.body(&method.body, Some(&frame), &bindings)? {
                self.trace(TraceEvent::Succeed, &frame, &bindings)?;
                return Ok(true);
            }

            self.output = saved_output;
            self.state = saved_state;
            if i + 1 < candidates.len() {
                self.trace(TraceEvent::MethodFail, &frame, &bindings)?;
            }
        }

        self.trace(TraceEvent::CallFail, &frame, &[])?;
        Ok(false)
    }

    fn builtin(&mut self, builtin: Builtin, args: Vec<String>, frame: Option<&FrameRef>, scope: &[Binding]) -> EngineResult<bool> {
        if args.len() < builtin.min_args() {
            return Err(fault_at(format!("[{}] needs a variable name", builtin.name()), frame));
        }
        match builtin {
            Builtin::Pause => self.ctx.pause(&self.output, &self.env(scope), frame)?,
            Builtin::Break => {
                let message = (!args.is_empty()).then(|| args.join(" "));
                self.ctx.break_here(message, &self.output, &self.env(scope), frame)?
            }
            Builtin::SampleOutputText => self.ctx.sample_output(&self.output, &self.state),
            Builtin::ClearOutput => self.output.clear(),
            Builtin::Fail => return Ok(false),
            Builtin::Set => {
                self.state.set(args[0].as_str(), args[1..].join(" "));
            }
            Builtin::Is => return Ok(self.state.get(&args[0]).unwrap_or("") == args[1..].join(" ")),
            Builtin::Get => match self.state.get(&args[0]) {
                Some(value) => {
                    let value = value.to_string();
                    append_word(&mut self.output, &value);
                }
                None => return Ok(false),
            },
            Builtin::Throw => return Err(fault_at(args.join(" "), frame)),
        }
        Ok(true)
    }

    fn trace(&self, event: TraceEvent, frame: &FrameRef, bindings: &[Binding]) -> EngineResult<()> {
        trace!(call = %frame.describe(), %event, "trace event");
        self.ctx.trace(event, frame, &self.output, &self.env(bindings))?;
        Ok(())
    }

    fn env(&self, bindings: &[Binding]) -> Environment {
        Environment::new(self.state.clone()).with_bindings(bindings.to_vec())
    }
}

/// Append a word to the output, separated by a space unless it is closing
/// punctuation
fn append_word(output: &mut String, word: &str) {
    let closing = word.starts_with(|c: char| matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | ')'));
    if !output.is_empty() && !output.ends_with(char::is_whitespace) && !closing {
        output.push(' ');
    }
    output.push_str(word);
}

/// Code as quoted in messages; long generated code is cut short
fn abbreviate(code: &str) -> String {
    const MAX_CHARS: usize = 60;
    let code = code.trim();
    match code.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &code[..cut]),
        None => code.to_string(),
    }
}

fn bind(params: &[String], args: &[String]) -> Vec<Binding> {
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| Binding::new(format!("?{}", param), arg.as_str()))
        .collect()
}

fn lookup(scope: &[Binding], var: &str, frame: Option<&FrameRef>) -> EngineResult<String> {
    scope
        .iter()
        .find(|b| b.name.strip_prefix('?') == Some(var))
        .map(|b| b.value.clone())
        .ok_or_else(|| fault_at(format!("Unbound variable ?{}", var), frame))
}

/// A fault carrying the call stack at `frame`
fn fault_at(message: impl Into<String>, frame: Option<&FrameRef>) -> EngineError {
    EngineError::Fault {
        message: message.into(),
        stack: frame.map(|f| f.ancestry()).unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;

//! Main REPL implementation
//!
//! Two threads: an input thread blocked in the line editor, and the
//! controlling thread that owns the [`StepController`]. The input thread
//! never touches the controller; it queues each line on a
//! [`DeferredQueue`] that the controlling thread drains once per tick.

use colored::*;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor, EditMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use steprepl_controller::{DeferredQueue, DeferredSender, StepController, TickStatus, View};
use steprepl_script::{Builtin, ScriptEngine};
use tracing::{debug, info, warn};

use crate::commands::{repeat_run, ReplCommand, COMMANDS};
use crate::config::ReplConfig;
use crate::error::{ReplError, ReplResult};

/// The REPL host
pub struct Repl<V: View> {
    config: ReplConfig,
    engine: Arc<ScriptEngine>,
    controller: StepController,
    view: V,
    program_path: Option<PathBuf>,
    last_command: Option<ReplCommand>,
    quit: bool,
}

impl<V: View> Repl<V> {
    /// Create a REPL, loading the program at `program_path` if given
    pub fn new(config: ReplConfig, program_path: Option<PathBuf>, view: V) -> ReplResult<Self> {
        let engine = Arc::new(ScriptEngine::with_options(Default::default(), config.script.clone()));
        if let Some(path) = &program_path {
            load_program(&engine, path)?;
        }
        let controller = StepController::new(engine.clone(), config.controller.clone());

        Ok(Self {
            config,
            engine,
            controller,
            view,
            program_path,
            last_command: None,
            quit: false,
        })
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn controller(&self) -> &StepController {
        &self.controller
    }

    pub fn engine(&self) -> &ScriptEngine {
        &self.engine
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// One pass of the driver loop
    pub fn tick(&mut self) -> TickStatus {
        self.controller.tick(&mut self.view)
    }

    /// Handle one input line. An empty line repeats the last command.
    pub fn handle_line(&mut self, line: &str) -> ReplResult<()> {
        let command = if line.trim().is_empty() {
            match self.last_command.clone() {
                Some(command) => command,
                None => return Ok(()),
            }
        } else {
            ReplCommand::parse(line)?
        };
        if command.repeatable() {
            self.last_command = Some(command.clone());
        }
        self.execute(command)
    }

    pub fn execute(&mut self, command: ReplCommand) -> ReplResult<()> {
        debug!(?command, "executing command");
        match command {
            ReplCommand::Run(code) => {
                self.controller.start(code, &mut self.view)?;
            }
            ReplCommand::Debug(code) => {
                self.controller.start_stepping(code, &mut self.view)?;
            }
            ReplCommand::Test { count, code } => {
                self.controller.start(repeat_run(&code, count), &mut self.view)?;
            }
            ReplCommand::StepInto => self.controller.step_into()?,
            ReplCommand::StepOver => self.controller.step_over()?,
            ReplCommand::StepOut => self.controller.step_out()?,
            ReplCommand::Continue => self.controller.continue_run()?,
            ReplCommand::Abort => {
                if !self.controller.abort(&mut self.view) {
                    println!("Nothing is running");
                }
            }
            ReplCommand::Interrupt => self.controller.interrupt()?,
            ReplCommand::State => self.controller.dump_state(&mut self.view)?,
            ReplCommand::Reload => self.reload()?,
            ReplCommand::Tasks => {
                let program = self.engine.program();
                if program.task_count() == 0 {
                    println!("No tasks defined");
                }
                for name in program.task_names() {
                    println!("  {}", name.bright_cyan());
                }
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Quit => {
                self.controller.abort(&mut self.view);
                self.quit = true;
            }
        }
        Ok(())
    }

    /// Reload the program file; the running program keeps the old one
    pub fn reload(&mut self) -> ReplResult<()> {
        let path = self
            .program_path
            .as_ref()
            .ok_or_else(|| ReplError::Command("No program file to reload".to_string()))?;
        let count = load_program(&self.engine, path)?;
        println!("Loaded {} tasks from {}", count, path.display());
        Ok(())
    }
}

impl<V: View + 'static> Repl<V> {
    /// Run the REPL until `:quit` or end of input
    pub fn run(mut self) -> ReplResult<()> {
        if self.config.show_banner {
            print_banner();
        }

        let mut queue: DeferredQueue<Self> = DeferredQueue::new();
        spawn_input_thread(self.config.clone(), queue.sender())?;

        let interval = self.config.tick_interval();
        while !self.quit {
            queue.drain(&mut self);
            self.tick();
            thread::sleep(interval);
        }
        info!("repl exiting");
        Ok(())
    }
}

fn load_program(engine: &ScriptEngine, path: &Path) -> ReplResult<usize> {
    let source = std::fs::read_to_string(path)?;
    let count = engine.load(&source)?;
    info!(path = %path.display(), tasks = count, "loaded program");

    let warnings = engine.program().warnings();
    if !warnings.is_empty() {
        warn!(path = %path.display(), count = warnings.len(), "program has warnings");
        println!(
            "{}",
            "Possible problems in the program; they may be intentional:".yellow()
        );
        for warning in &warnings {
            println!("  {}", warning.yellow());
        }
    }
    Ok(count)
}

fn build_editor(config: &ReplConfig) -> ReplResult<DefaultEditor> {
    let editor_config = Config::builder()
        .max_history_size(config.max_history)?
        .history_ignore_space(true)
        .edit_mode(EditMode::Emacs)
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)?;
    if let Some(path) = config.history_path() {
        if path.exists() {
            if let Err(err) = editor.load_history(&path) {
                warn!(path = %path.display(), error = %err, "could not load history");
            }
        }
    }
    Ok(editor)
}

fn spawn_input_thread<V: View + 'static>(config: ReplConfig, sender: DeferredSender<Repl<V>>) -> ReplResult<()> {
    thread::Builder::new().name("steprepl-input".to_string()).spawn(move || {
        let mut editor = match build_editor(&config) {
            Ok(editor) => editor,
            Err(err) => {
                eprintln!("{}: {}", "Error".red().bold(), err);
                sender.enqueue(|repl: &mut Repl<V>| {
                    let _ = repl.execute(ReplCommand::Quit);
                });
                return;
            }
        };

        loop {
            match editor.readline(&config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    let quitting = matches!(ReplCommand::parse(&line), Ok(ReplCommand::Quit));
                    sender.enqueue(move |repl: &mut Repl<V>| {
                        if let Err(err) = repl.handle_line(&line) {
                            eprintln!("{}: {}", "Error".red().bold(), err);
                        }
                    });
                    if quitting {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    sender.enqueue(|repl: &mut Repl<V>| {
                        if repl.controller().is_active() {
                            if let Err(err) = repl.execute(ReplCommand::Interrupt) {
                                eprintln!("{}: {}", "Error".red().bold(), err);
                            }
                        } else {
                            println!("\nUse :quit to exit, or press Ctrl-D");
                        }
                    });
                }
                Err(ReadlineError::Eof) => {
                    sender.enqueue(|repl: &mut Repl<V>| {
                        let _ = repl.execute(ReplCommand::Quit);
                    });
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {}", "Error".red().bold(), err);
                    sender.enqueue(|repl: &mut Repl<V>| {
                        let _ = repl.execute(ReplCommand::Quit);
                    });
                    break;
                }
            }
        }

        if let Some(path) = config.history_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(err) = editor.save_history(&path) {
                warn!(path = %path.display(), error = %err, "could not save history");
            }
        }
    })?;
    Ok(())
}

fn print_banner() {
    println!("{}", "StepRepl".bright_white().bold());
    println!(
        "Type a call such as {} to run it, {} for help, {} to exit",
        "[Story]".bright_cyan(),
        ":help".bright_cyan(),
        ":quit".bright_cyan()
    );
    println!();
}

fn print_help() {
    println!("{}", "Commands:".bright_white().bold());
    for cmd in COMMANDS {
        let aliases = if cmd.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", cmd.aliases.join(", "))
        };
        println!("  {}{} - {}", cmd.usage.bright_cyan(), aliases.bright_black(), cmd.description);
    }
    println!("  {} - Repeat the last command", "<empty line>".bright_cyan());
    println!();
    println!("{}", "Builtins:".bright_white().bold());
    for builtin in Builtin::ALL {
        println!("  {}", builtin.usage());
    }
    println!();
}

#[cfg(test)]
#[path = "repl_tests.rs"]
mod tests;

//! REPL command parsing

use crate::error::{ReplError, ReplResult};

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Run code
    Run(String),
    /// Run code, halting at its first call
    Debug(String),
    /// Run code `count` times in one run, sampling the output after each
    Test { count: usize, code: String },
    StepInto,
    StepOver,
    StepOut,
    Continue,
    Abort,
    /// Halt a running program at its next call
    Interrupt,
    /// Show the world state
    State,
    /// Reload the program file
    Reload,
    /// List the defined tasks
    Tasks,
    Help,
    Quit,
}

/// Help entry for a `:` command
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub description: &'static str,
}

/// Most attempts one `:test` accepts
pub const MAX_TEST_COUNT: usize = 10_000;

/// Every `:` command, in help order
pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "debug",
        aliases: &["d"],
        usage: ":debug <code>",
        description: "Run code, halting at its first call",
    },
    CommandInfo {
        name: "test",
        aliases: &[],
        usage: ":test <count> <code>",
        description: "Run code repeatedly, showing the output of each attempt",
    },
    CommandInfo {
        name: "step",
        aliases: &["s"],
        usage: ":step",
        description: "Step into: halt at the next call event",
    },
    CommandInfo {
        name: "over",
        aliases: &["n"],
        usage: ":over",
        description: "Step over: halt once the current call returns",
    },
    CommandInfo {
        name: "out",
        aliases: &["o"],
        usage: ":out",
        description: "Step out: halt once the caller returns",
    },
    CommandInfo {
        name: "continue",
        aliases: &["c"],
        usage: ":continue",
        description: "Run until the next explicit break",
    },
    CommandInfo {
        name: "abort",
        aliases: &["a"],
        usage: ":abort",
        description: "Abort the running program",
    },
    CommandInfo {
        name: "interrupt",
        aliases: &["i"],
        usage: ":interrupt",
        description: "Halt the running program at its next call (also Ctrl-C)",
    },
    CommandInfo {
        name: "state",
        aliases: &["vars"],
        usage: ":state",
        description: "Show the state variables",
    },
    CommandInfo {
        name: "reload",
        aliases: &["r"],
        usage: ":reload",
        description: "Reload the program file",
    },
    CommandInfo {
        name: "tasks",
        aliases: &["t"],
        usage: ":tasks",
        description: "List the defined tasks",
    },
    CommandInfo {
        name: "help",
        aliases: &["h", "?"],
        usage: ":help",
        description: "Show this help",
    },
    CommandInfo {
        name: "quit",
        aliases: &["q", "exit"],
        usage: ":quit",
        description: "Abort any running program and exit",
    },
];

impl ReplCommand {
    /// Parse a non-empty input line. Lines not starting with `:` are code;
    /// code that does not start with `[` is treated as a single call.
    pub fn parse(line: &str) -> ReplResult<Self> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(ReplCommand::Run(as_call(line)));
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        let info = COMMANDS
            .iter()
            .find(|info| info.name == name || info.aliases.contains(&name))
            .ok_or_else(|| ReplError::Command(format!("Unknown command: :{} (try :help)", name)))?;

        let parsed = match info.name {
            "debug" if rest.is_empty() => return Err(ReplError::Command(format!("Usage: {}", info.usage))),
            "debug" => ReplCommand::Debug(as_call(rest)),
            "test" => parse_test(rest).ok_or_else(|| ReplError::Command(format!("Usage: {}", info.usage)))?,
            "step" => ReplCommand::StepInto,
            "over" => ReplCommand::StepOver,
            "out" => ReplCommand::StepOut,
            "continue" => ReplCommand::Continue,
            "abort" => ReplCommand::Abort,
            "interrupt" => ReplCommand::Interrupt,
            "state" => ReplCommand::State,
            "reload" => ReplCommand::Reload,
            "tasks" => ReplCommand::Tasks,
            "help" => ReplCommand::Help,
            _ => ReplCommand::Quit,
        };
        Ok(parsed)
    }

    /// Whether an empty line should repeat this command
    pub fn repeatable(&self) -> bool {
        !matches!(self, ReplCommand::Quit | ReplCommand::Help)
    }
}

fn parse_test(rest: &str) -> Option<ReplCommand> {
    let (count, code) = rest.split_once(char::is_whitespace)?;
    let count = count.parse::<usize>().ok().filter(|n| (1..=MAX_TEST_COUNT).contains(n))?;
    let code = code.trim();
    (!code.is_empty()).then(|| ReplCommand::Test {
        count,
        code: as_call(code),
    })
}

/// Code that runs `code` `count` times, clearing the output before each
/// attempt and sampling it after
pub fn repeat_run(code: &str, count: usize) -> String {
    (1..=count)
        .map(|attempt| format!("[ClearOutput] Test: {} {} [SampleOutputText]", attempt, code))
        .collect::<Vec<_>>()
        .join(" ")
}

fn as_call(code: &str) -> String {
    if code.starts_with('[') {
        code.to_string()
    } else {
        format!("[{}]", code)
    }
}

//! StepRepl binary

use anyhow::Context;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use steprepl_core::{Engine, WorldState};
use steprepl_repl::{load_config, Repl, TerminalView};

#[derive(Parser)]
#[command(name = "steprepl")]
#[command(about = "Run and single-step task programs", long_about = None)]
#[command(version)]
struct Cli {
    /// Program file to load
    program: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, env = "STEPREPL_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// History file path
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Don't show banner
    #[arg(long)]
    no_banner: bool,

    /// Run this code once without the debugger, print its output and exit
    #[arg(short, long)]
    eval: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if cli.no_banner {
        config.show_banner = false;
    }
    if let Some(history_file) = cli.history_file {
        config.history_file = Some(history_file);
    }

    let level = match cli.verbose {
        0 => config.log_level()?,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let repl = Repl::new(config, cli.program, TerminalView::stdout())?;

    if let Some(code) = cli.eval {
        let code = steprepl_repl::ReplCommand::parse(&code)?;
        let steprepl_repl::ReplCommand::Run(code) = code else {
            anyhow::bail!("--eval takes code, not a : command");
        };
        let engine = repl.engine();
        let mut builder = std::thread::Builder::new().name("steprepl-eval".to_string());
        if let Some(stack_size) = engine.stack_size_hint() {
            builder = builder.stack_size(stack_size);
        }
        let result = std::thread::scope(|scope| {
            builder
                .spawn_scoped(scope, || engine.run(&code, WorldState::new()))
                .map(|worker| worker.join())
        })?
        .map_err(|_| anyhow::anyhow!("evaluation panicked"))?;
        match result {
            Ok(completion) => println!("{}", completion.text),
            Err(err) => {
                eprintln!("{}: {}", "Error".red().bold(), err);
                for call in err.stack() {
                    eprintln!("  in {}", call);
                }
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    repl.run()?;
    Ok(())
}

//! Terminal rendering of controller updates

use colored::*;
use std::io::{self, Stdout, Write};
use steprepl_controller::{HaltHeadline, HaltReport, View, ViewUpdate};
use tracing::warn;

/// Draws controller updates as colored text
pub struct TerminalView<W: Write> {
    out: W,
}

impl TerminalView<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, update: ViewUpdate) -> io::Result<()> {
        match update {
            ViewUpdate::Started { .. } | ViewUpdate::Resumed { .. } => {}
            ViewUpdate::Halted(report) => self.draw_halt(&report)?,
            ViewUpdate::Sample { text } => writeln!(self.out, "{}", text.bright_black())?,
            ViewUpdate::Finished { text } => writeln!(self.out, "{}", text.cyan())?,
            ViewUpdate::Faulted { message, stack } => {
                writeln!(self.out, "{}: {}", "Error".red().bold(), message)?;
                for call in stack {
                    writeln!(self.out, "  {} {}", "in".bright_black(), call)?;
                }
            }
            ViewUpdate::Aborted { .. } => writeln!(self.out, "{}", "Aborted".red())?,
            ViewUpdate::StateDump(vars) if vars.is_empty() => {
                writeln!(self.out, "State variables all have their default values")?
            }
            ViewUpdate::StateDump(vars) => {
                for (name, value) in vars {
                    writeln!(self.out, "{} = {}", name.bright_cyan(), value)?;
                }
            }
        }
        self.out.flush()
    }

    fn draw_halt(&mut self, report: &HaltReport) -> io::Result<()> {
        let headline = match &report.headline {
            HaltHeadline::Break(message) => format!("Break: {}", message),
            HaltHeadline::Trace { event, call } => format!("{}: {}", event, call),
            HaltHeadline::Paused => "Paused".to_string(),
        };
        writeln!(self.out, "{}", headline.yellow().bold())?;
        if !report.output.is_empty() {
            writeln!(self.out, "{}", report.output.cyan())?;
        }
        if let Some(stack) = &report.stack {
            for call in stack {
                writeln!(self.out, "  {} {}", "in".bright_black(), call)?;
            }
        }
        for binding in &report.bindings {
            writeln!(self.out, "  {}", binding.to_string().bright_cyan())?;
        }
        writeln!(
            self.out,
            "{}",
            ":step  :over  :out  :continue  :abort  :state".bright_black()
        )
    }
}

impl<W: Write> View for TerminalView<W> {
    fn render(&mut self, update: ViewUpdate) {
        if let Err(err) = self.draw(update) {
            warn!(error = %err, "failed to write to terminal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steprepl_core::{Binding, TraceEvent};

    fn render(updates: Vec<ViewUpdate>) -> String {
        colored::control::set_override(false);
        let mut view = TerminalView::new(Vec::new());
        for update in updates {
            view.render(update);
        }
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn test_trace_halt() {
        let report = HaltReport {
            task: 1,
            halt_seq: 1,
            headline: HaltHeadline::Trace {
                event: TraceEvent::Enter,
                call: "[Greet Zed]".to_string(),
            },
            output: "so far".to_string(),
            stack: Some(vec!["[Greet Zed]".to_string(), "[Story]".to_string()]),
            bindings: vec![Binding::new("?who", "Zed")],
        };
        let text = render(vec![ViewUpdate::Halted(report)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Enter method: [Greet Zed]");
        assert_eq!(lines[1], "so far");
        assert_eq!(lines[2], "  in [Greet Zed]");
        assert_eq!(lines[3], "  in [Story]");
        assert_eq!(lines[4], "  ?who = Zed");
    }

    #[test]
    fn test_state_dump() {
        assert_eq!(
            render(vec![ViewUpdate::StateDump(Vec::new())]),
            "State variables all have their default values\n"
        );
        assert_eq!(
            render(vec![ViewUpdate::StateDump(vec![("lamp".to_string(), "lit".to_string())])]),
            "lamp = lit\n"
        );
    }

    #[test]
    fn test_endings() {
        let text = render(vec![
            ViewUpdate::Started { task: 1, code: "[A]".to_string() },
            ViewUpdate::Finished { text: "done".to_string() },
            ViewUpdate::Faulted {
                message: "boom".to_string(),
                stack: vec!["[A]".to_string()],
            },
            ViewUpdate::Aborted { task: 2 },
        ]);
        assert_eq!(text, "done\nError: boom\n  in [A]\nAborted\n");
    }
}

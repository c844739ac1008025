//! What the controller asks the host to display

use steprepl_core::{Binding, TraceEvent};

use crate::gate::StepCommand;
use crate::task::{ExecutionSnapshot, TaskId};

/// First line of a halt report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltHeadline {
    /// An explicit break with a message
    Break(String),
    /// A trace event, with the textual form of the halted call
    Trace { event: TraceEvent, call: String },
    /// An explicit pause or break without a message
    Paused,
}

/// Everything shown for one halt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaltReport {
    pub task: TaskId,
    pub halt_seq: u64,
    pub headline: HaltHeadline,
    /// Output produced so far
    pub output: String,
    /// Call stack, innermost first; `None` unless the stack was requested
    pub stack: Option<Vec<String>>,
    /// Bindings of the halted call; empty for explicit breaks
    pub bindings: Vec<Binding>,
}

impl HaltReport {
    pub fn from_snapshot(task: TaskId, snapshot: &ExecutionSnapshot) -> Self {
        let headline = match (&snapshot.break_message, &snapshot.frame) {
            (Some(message), _) => HaltHeadline::Break(message.clone()),
            (None, Some(frame)) if snapshot.trace_event != TraceEvent::None => HaltHeadline::Trace {
                event: snapshot.trace_event,
                call: frame.describe(),
            },
            _ => HaltHeadline::Paused,
        };
        let stack = snapshot
            .show_stack
            .then(|| snapshot.frame.as_ref().map(|f| f.ancestry()).unwrap_or_default());
        let bindings = match snapshot.trace_event {
            TraceEvent::None => Vec::new(),
            _ => snapshot.bindings.clone(),
        };

        Self {
            task,
            halt_seq: snapshot.halt_seq,
            headline,
            output: snapshot.text.clone(),
            stack,
            bindings,
        }
    }
}

/// A display update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    /// A new run started; clear both output and debug panes
    Started { task: TaskId, code: String },
    /// The run halted
    Halted(HaltReport),
    /// The run was resumed with `command`
    Resumed { command: StepCommand },
    /// Output sampled while the run keeps going
    Sample { text: String },
    /// The run returned
    Finished { text: String },
    /// The run faulted; prior output stays on screen
    Faulted { message: String, stack: Vec<String> },
    /// The run was aborted
    Aborted { task: TaskId },
    /// State variables in name order; empty when all have default values
    StateDump(Vec<(String, String)>),
}

/// The host's display
pub trait View {
    fn render(&mut self, update: ViewUpdate);
}

/// Collects updates; handy for hosts that render later, and for tests
impl View for Vec<ViewUpdate> {
    fn render(&mut self, update: ViewUpdate) {
        self.push(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::frame;
    use steprepl_core::WorldState;

    fn snapshot() -> ExecutionSnapshot {
        let outer = frame("Outer", None);
        ExecutionSnapshot {
            text: "partial".to_string(),
            state: WorldState::new(),
            trace_event: TraceEvent::Enter,
            break_message: None,
            show_stack: true,
            frame: Some(frame("Inner", Some(&outer))),
            bindings: vec![Binding::new("?x", "1")],
            halt_seq: 3,
        }
    }

    #[test]
    fn test_trace_halt_report() {
        let report = HaltReport::from_snapshot(9, &snapshot());
        assert_eq!(report.task, 9);
        assert_eq!(report.halt_seq, 3);
        assert_eq!(
            report.headline,
            HaltHeadline::Trace { event: TraceEvent::Enter, call: "Inner".to_string() }
        );
        assert_eq!(report.output, "partial");
        assert_eq!(report.stack, Some(vec!["Inner".to_string(), "Outer".to_string()]));
        assert_eq!(report.bindings.len(), 1);
    }

    #[test]
    fn test_break_message_wins_and_hides_bindings() {
        let mut snap = snapshot();
        snap.break_message = Some("look here".to_string());
        snap.trace_event = TraceEvent::None;
        let report = HaltReport::from_snapshot(1, &snap);
        assert_eq!(report.headline, HaltHeadline::Break("look here".to_string()));
        assert!(report.bindings.is_empty());
    }

    #[test]
    fn test_pause_without_stack() {
        let mut snap = snapshot();
        snap.trace_event = TraceEvent::None;
        snap.show_stack = false;
        snap.frame = None;
        let report = HaltReport::from_snapshot(1, &snap);
        assert_eq!(report.headline, HaltHeadline::Paused);
        assert_eq!(report.stack, None);
    }
}

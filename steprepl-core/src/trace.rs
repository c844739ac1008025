//! Trace event classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the interpreter invoked the trace hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TraceEvent {
    /// Not a trace event; used for explicit breaks
    #[default]
    None,
    /// Entering a call
    Enter,
    /// A method of the call succeeded
    Succeed,
    /// A method failed but alternatives remain
    MethodFail,
    /// The call failed with no alternatives left
    CallFail,
}

impl TraceEvent {
    /// Events after which the reporting call has finished
    pub fn ends_call(self) -> bool {
        matches!(self, TraceEvent::Succeed | TraceEvent::CallFail)
    }

    /// Label shown in front of the halted call
    pub fn label(self) -> &'static str {
        match self {
            TraceEvent::None => "Paused",
            TraceEvent::Enter => "Enter method",
            TraceEvent::Succeed => "Method succeeded",
            TraceEvent::MethodFail => "Method failed",
            TraceEvent::CallFail => "Call failed",
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

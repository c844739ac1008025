//! Primitive tasks
//!
//! Builtins are called like any other task but never report trace events
//! themselves.

/// A primitive task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Halt; the call stack is shown only while single-stepping
    Pause,
    /// Halt with an optional message and the call stack
    Break,
    /// Publish the output so far without halting
    SampleOutputText,
    /// Discard the output so far
    ClearOutput,
    /// Fail the current method
    Fail,
    /// `[Set var value ...]`
    Set,
    /// `[Is var value ...]`; fails unless the variable has that value
    Is,
    /// `[Get var]`; outputs the value, fails when unset
    Get,
    /// `[Throw message ...]`; aborts the run with a fault
    Throw,
}

impl Builtin {
    pub const ALL: [Builtin; 9] = [
        Builtin::Pause,
        Builtin::Break,
        Builtin::SampleOutputText,
        Builtin::ClearOutput,
        Builtin::Fail,
        Builtin::Set,
        Builtin::Is,
        Builtin::Get,
        Builtin::Throw,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Pause => "Pause",
            Builtin::Break => "Break",
            Builtin::SampleOutputText => "SampleOutputText",
            Builtin::ClearOutput => "ClearOutput",
            Builtin::Fail => "Fail",
            Builtin::Set => "Set",
            Builtin::Is => "Is",
            Builtin::Get => "Get",
            Builtin::Throw => "Throw",
        }
    }

    /// Usage line for help output
    pub fn usage(self) -> &'static str {
        match self {
            Builtin::Pause => "[Pause]            halt here",
            Builtin::Break => "[Break message]    halt with a message and the call stack",
            Builtin::SampleOutputText => "[SampleOutputText] show the output so far, keep running",
            Builtin::ClearOutput => "[ClearOutput]      discard the output so far",
            Builtin::Fail => "[Fail]             fail the current method",
            Builtin::Set => "[Set var value]    set a state variable",
            Builtin::Is => "[Is var value]     succeed only if var has that value",
            Builtin::Get => "[Get var]          output a state variable",
            Builtin::Throw => "[Throw message]    stop the run with an error",
        }
    }

    /// Minimum number of arguments
    pub fn min_args(self) -> usize {
        match self {
            Builtin::Set | Builtin::Is | Builtin::Get => 1,
            _ => 0,
        }
    }
}

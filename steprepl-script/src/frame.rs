//! Call frames of running scripts

use std::fmt;
use std::sync::Arc;
use steprepl_core::{CallFrame, FrameRef};

/// One active task call
#[derive(Debug)]
pub struct ScriptFrame {
    task: String,
    args: Vec<String>,
    depth: usize,
    caller: Option<FrameRef>,
}

impl ScriptFrame {
    /// A call of `task` made from `caller`; top-level calls have depth 0
    pub fn new(task: impl Into<String>, args: Vec<String>, caller: Option<&FrameRef>) -> FrameRef {
        Arc::new(Self {
            task: task.into(),
            args,
            depth: caller.map_or(0, |c| c.depth() + 1),
            caller: caller.cloned(),
        })
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for ScriptFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.task)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, "]")
    }
}

impl CallFrame for ScriptFrame {
    fn depth(&self) -> usize {
        self.depth
    }

    fn caller(&self) -> Option<FrameRef> {
        self.caller.clone()
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_follows_callers() {
        let top = ScriptFrame::new("Top", vec![], None);
        let inner = ScriptFrame::new("Inner", vec!["x".to_string()], Some(&top));
        assert_eq!(top.depth(), 0);
        assert_eq!(inner.depth(), 1);
        assert_eq!(inner.describe(), "[Inner x]");
        assert_eq!(inner.ancestry(), vec!["[Inner x]".to_string(), "[Top]".to_string()]);
    }
}

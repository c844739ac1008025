//! Syntax tree of a script program

use rustc_hash::FxHashMap;
use std::fmt;

use crate::builtins::Builtin;

/// A call argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Word(String),
    Var(String),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Word(w) => write!(f, "{}", w),
            Arg::Var(v) => write!(f, "?{}", v),
        }
    }
}

/// One element of a method body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Literal output text
    Word(String),
    /// Output the value bound to a parameter
    Var(String),
    /// `[Task arg ...]`
    Call { task: String, args: Vec<Arg> },
}

/// A sequence of body elements
pub type Body = Vec<Element>;

/// One way of performing a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub task: String,
    pub params: Vec<String>,
    pub body: Body,
    /// Source line, 1-based
    pub line: usize,
}

impl Method {
    /// Whether this method can take `arity` arguments
    pub fn accepts(&self, arity: usize) -> bool {
        self.params.len() == arity
    }
}

/// A parsed program: every task's methods in source order
#[derive(Debug, Clone, Default)]
pub struct Program {
    tasks: FxHashMap<String, Vec<Method>>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_method(&mut self, method: Method) {
        self.tasks.entry(method.task.clone()).or_default().push(method);
    }

    /// Methods of `task`, in the order they are tried
    pub fn methods(&self, task: &str) -> Option<&[Method]> {
        self.tasks.get(task).map(Vec::as_slice)
    }

    pub fn is_defined(&self, task: &str) -> bool {
        self.tasks.contains_key(task)
    }

    /// Defined task names, sorted
    pub fn task_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Likely mistakes that still parse: calls to undefined tasks, and
    /// calls no method of the task can take. Ordered by source line.
    pub fn warnings(&self) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();
        for method in self.tasks.values().flatten() {
            for element in &method.body {
                let Element::Call { task, args } = element else {
                    continue;
                };
                if Builtin::from_name(task).is_some() {
                    continue;
                }
                if !self.is_defined(task) {
                    found.push((method.line, format!("{} calls undefined task {}", method.task, task)));
                } else if !self.methods(task).unwrap_or_default().iter().any(|m| m.accepts(args.len())) {
                    found.push((
                        method.line,
                        format!("{} calls {} with {} arguments, which no method takes", method.task, task, args.len()),
                    ));
                }
            }
        }
        found.sort();
        found.into_iter().map(|(line, msg)| format!("line {}: {}", line, msg)).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_program;

    #[test]
    fn test_warnings() {
        let program = parse_program("A: [B] [Missing] [Set x 1]\nB ?who: hi ?who\nC: [A]").unwrap();
        assert_eq!(
            program.warnings(),
            vec![
                "line 1: A calls B with 0 arguments, which no method takes".to_string(),
                "line 1: A calls undefined task Missing".to_string(),
            ]
        );
        assert!(parse_program("A: [B]\nB: b").unwrap().warnings().is_empty());
    }
}

//! World state and binding environments

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Global variables visible to a program run.
///
/// Opaque to the controller apart from the read-only dump it offers the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    vars: BTreeMap<String, String>,
}

impl WorldState {
    /// An empty state; every variable has its default value
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Set a variable, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(name.into(), value.into())
    }

    /// Whether no variable has been set
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for WorldState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A local variable binding at the point of a trace event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: String,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// What the interpreter passes along with each trace event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// World state at the trace point
    pub state: WorldState,
    /// Local bindings of the reporting call
    pub bindings: Vec<Binding>,
}

impl Environment {
    pub fn new(state: WorldState) -> Self {
        Self {
            state,
            bindings: Vec::new(),
        }
    }

    pub fn with_bindings(mut self, bindings: Vec<Binding>) -> Self {
        self.bindings = bindings;
        self
    }
}

//! Controller configuration

use serde::{Deserialize, Serialize};

/// How the step target's level compares against the level a call returns to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthBoundary {
    /// Halt when control returns to the target level or above (`<=`)
    #[default]
    Inclusive,
    /// Halt only when control returns strictly above the target level (`<`)
    Exclusive,
}

impl DepthBoundary {
    /// Whether a call returning to `level` has reached `target`
    pub fn reached(self, level: usize, target: usize) -> bool {
        match self {
            DepthBoundary::Inclusive => level <= target,
            DepthBoundary::Exclusive => level < target,
        }
    }
}

/// Execution controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Step-over / step-out boundary comparison
    pub boundary: DepthBoundary,

    /// Worker thread name prefix; the task id is appended
    pub thread_name: String,

    /// Stack size for worker threads. The engine's own stack hint is used
    /// when larger; with neither, the system default applies.
    pub stack_size: Option<usize>,

    /// Carry the final world state of a completed run into the next run
    pub retain_state: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            boundary: DepthBoundary::Inclusive,
            thread_name: "steprepl-worker".to_string(),
            stack_size: None,
            retain_state: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_comparison() {
        assert!(DepthBoundary::Inclusive.reached(2, 2));
        assert!(DepthBoundary::Inclusive.reached(1, 2));
        assert!(!DepthBoundary::Inclusive.reached(3, 2));

        assert!(!DepthBoundary::Exclusive.reached(2, 2));
        assert!(DepthBoundary::Exclusive.reached(1, 2));
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: ControllerConfig = toml::from_str("boundary = \"exclusive\"").unwrap();
        assert_eq!(config.boundary, DepthBoundary::Exclusive);
        assert_eq!(config.thread_name, "steprepl-worker");
        assert_eq!(config.stack_size, None);
        assert!(!config.retain_state);
    }
}

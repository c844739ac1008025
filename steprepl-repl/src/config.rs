//! Configuration handling for the StepRepl REPL

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use steprepl_controller::ControllerConfig;
use steprepl_script::ScriptOptions;

use crate::error::{ReplError, ReplResult};

/// REPL configuration, read from `~/.steprepl/config.toml` by default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplConfig {
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Pause between driver ticks, in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    #[serde(default)]
    pub history_file: Option<PathBuf>,

    #[serde(default = "default_max_history")]
    pub max_history: usize,

    #[serde(default = "default_true")]
    pub show_banner: bool,

    /// `error`, `warn`, `info`, `debug` or `trace`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub script: ScriptOptions,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            tick_interval_ms: default_tick_interval(),
            history_file: None,
            max_history: default_max_history(),
            show_banner: default_true(),
            log_level: default_log_level(),
            controller: ControllerConfig::default(),
            script: ScriptOptions::default(),
        }
    }
}

impl ReplConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// History file to use: the configured one, else `~/.steprepl/history`
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(|| config_dir().map(|dir| dir.join("history")))
    }

    pub fn log_level(&self) -> ReplResult<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| ReplError::Config(format!("Unknown log level: {}", self.log_level)))
    }
}

fn default_prompt() -> String {
    "step> ".to_string()
}
fn default_tick_interval() -> u64 {
    50
}
fn default_max_history() -> usize {
    1000
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

/// `~/.steprepl`
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".steprepl"))
}

/// Load configuration from `path`, or from the default location when it
/// exists, or use defaults
pub fn load_config(path: Option<&Path>) -> ReplResult<ReplConfig> {
    match path {
        Some(path) => read_config(path),
        None => match config_dir().map(|dir| dir.join("config.toml")) {
            Some(default_path) if default_path.exists() => read_config(&default_path),
            _ => Ok(ReplConfig::default()),
        },
    }
}

fn read_config(path: &Path) -> ReplResult<ReplConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ReplConfig = toml::from_str(&content)?;
    config.log_level()?;
    config
        .script
        .validate()
        .map_err(|err| ReplError::Config(err.to_string()))?;
    Ok(config)
}

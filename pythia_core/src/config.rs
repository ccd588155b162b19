//! Flow and join configuration.

use crate::error::{PythiaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a generated makeflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Number of parallel simulation tasks (<= 0 declares none)
    pub task_count: i64,

    /// Shared dataset every task unpacks
    pub settings_archive: String,

    /// Simulation executable
    pub executable: String,

    /// Command file passed to the executable
    pub command_file: String,

    /// Joiner executable the final rule depends on and runs
    pub joiner: String,

    /// Where the makeflow is written
    pub output_path: PathBuf,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            task_count: 10,
            settings_archive: "xmldoc.tar".to_string(),
            executable: "main42_new".to_string(),
            command_file: "command.cmnd".to_string(),
            joiner: "join-logs".to_string(),
            output_path: PathBuf::from("pythia.makeflow"),
        }
    }
}

/// Configuration for joining simulation outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Directory holding the numbered outputs
    pub input_dir: PathBuf,

    /// File name prefix; inputs are `<prefix>0`, `<prefix>1`, ...
    pub input_prefix: String,

    /// Aggregate output, truncated on every run
    pub output_path: PathBuf,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            input_prefix: "sim".to_string(),
            output_path: PathBuf::from("final"),
        }
    }
}

impl JoinConfig {
    /// Path of the input for a task index.
    pub fn input_path(&self, index: u64) -> PathBuf {
        self.input_dir.join(format!("{}{}", self.input_prefix, index))
    }
}

fn from_json_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| PythiaError::io(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| PythiaError::Config(format!("{}: {}", path.display(), e)))
}

impl FlowConfig {
    /// Loads a config from JSON; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        from_json_file(path.as_ref())
    }
}

impl JoinConfig {
    /// Loads a config from JSON; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        from_json_file(path.as_ref())
    }
}

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Optional settings read from `config.json` beside the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Sort key used by `task list` when `--sort` is not given.
    #[serde(default)]
    pub default_sort: Option<String>,
    /// `tracing` filter directive, e.g. `info` or `tasktree=debug`.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, TaskError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(TaskError::config(format!(
                    "Cannot read {}: {e}",
                    path.display()
                )))
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| TaskError::config(format!("Invalid config {}: {e}", path.display())))
    }
}

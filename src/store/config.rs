//! Store configuration
//!
//! Loaded from a JSON file; only `root_dir` is required.
//!
//! ```json
//! { "root_dir": "./data", "fsync": true, "stream_capacity": 1 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use crate::observability::Severity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory holding one subdirectory per collection
    pub root_dir: PathBuf,

    /// Permission bits for created directories (unix only)
    #[serde(default = "default_dir_mode")]
    pub dir_mode: u32,

    /// Permission bits for record files (unix only)
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,

    /// fsync the temp file before rename and the directory after it
    #[serde(default = "default_fsync")]
    pub fsync: bool,

    /// Records buffered between a stream producer and its consumer
    #[serde(default = "default_stream_capacity")]
    pub stream_capacity: usize,

    /// Minimum log severity: trace, info, warn, error or fatal
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_dir_mode() -> u32 {
    0o755
}
fn default_file_mode() -> u32 {
    0o644
}
fn default_fsync() -> bool {
    true
}
fn default_stream_capacity() -> usize {
    1
}
fn default_log_level() -> String {
    "info".to_string()
}

impl StoreConfig {
    /// Defaults for everything except the root directory
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            dir_mode: default_dir_mode(),
            file_mode: default_file_mode(),
            fsync: default_fsync(),
            stream_capacity: default_stream_capacity(),
            log_level: default_log_level(),
        }
    }

    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::io(format!("failed to read config {}", path.display()), e)
        })?;

        let config: StoreConfig = serde_json::from_str(&content).map_err(|e| {
            StoreError::validation(format!("invalid config JSON in {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(StoreError::validation("root_dir must not be empty"));
        }

        if self.stream_capacity == 0 {
            return Err(StoreError::validation("stream_capacity must be > 0"));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> StoreResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            StoreError::validation(format!(
                "invalid log_level '{}': expected trace, info, warn, error or fatal",
                self.log_level
            ))
        })
    }

    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    pub fn with_stream_capacity(mut self, capacity: usize) -> Self {
        self.stream_capacity = capacity;
        self
    }
}

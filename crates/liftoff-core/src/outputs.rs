//! Step outputs for downstream CI consumers

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::error::Result;
use crate::traits::OutputSink;

/// Appends outputs to the file named by `GITHUB_OUTPUT`
#[derive(Debug, Clone)]
pub struct GithubOutputFile {
    path: PathBuf,
}

impl GithubOutputFile {
    /// Write outputs to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `GITHUB_OUTPUT` when it is set
    pub fn from_env() -> Option<Self> {
        std::env::var_os("GITHUB_OUTPUT")
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }
}

/// Format one output entry, using heredoc syntax for multi-line values
pub fn format_output(key: &str, value: &str) -> String {
    if value.contains('\n') {
        let mut delimiter = String::from("LIFTOFF_EOF");
        while value.contains(&delimiter) {
            delimiter.push('_');
        }
        format!("{key}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{key}={value}\n")
    }
}

impl OutputSink for GithubOutputFile {
    fn set_output(&self, key: &str, value: &str) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_output(key, value).as_bytes())?;
        debug!(key, path = %self.path.display(), "wrote output");
        Ok(())
    }
}

/// Keeps outputs in memory; used when no output file is configured
#[derive(Debug, Default)]
pub struct MemoryOutputs {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryOutputs {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Value published under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    /// All published values
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .lock()
            .map(|values| values.clone())
            .unwrap_or_default()
    }
}

impl OutputSink for MemoryOutputs {
    fn set_output(&self, key: &str, value: &str) -> Result<()> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

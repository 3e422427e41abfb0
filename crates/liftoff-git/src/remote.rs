//! Remote operations

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tracing::{info, instrument};

use crate::repository::Result;
use liftoff_core::error::GitError;

/// Fetch tag refs using the git CLI
///
/// Shallow CI checkouts often carry no tags, and the CLI picks up whatever
/// credentials the checkout step configured. A non-zero exit fails with the
/// trimmed stderr as the message.
#[instrument(fields(dir = %dir.display()))]
pub fn git_fetch_tags(dir: &Path) -> Result<()> {
    let git = which::which("git").map_err(|_| GitError::ToolNotFound("git".to_string()))?;

    let start = Instant::now();
    let output = Command::new(git)
        .args(["fetch", "--tags", "--depth=1"])
        .current_dir(dir)
        .output()
        .map_err(|e| GitError::FetchFailed(e.to_string()))?;

    info!(
        duration_ms = start.elapsed().as_millis(),
        success = output.status.success(),
        "git fetch tags (CLI)"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("git fetch exited with {}", output.status)
        } else {
            stderr
        };
        return Err(GitError::FetchFailed(message));
    }

    Ok(())
}

//! Staged build artifacts
//!
//! A download step lays artifacts out as one directory per artifact under a
//! staging root. [`StagedArtifacts`] reads that layout and [`expand`] turns
//! the artifacts into individual upload candidates.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::error::{ArtifactError, Result};
use crate::mime;
use crate::traits::ArtifactSource;
use crate::types::{ArtifactDescriptor, AssetCandidate};

/// Artifacts already materialized in a staging directory
#[derive(Debug, Clone)]
pub struct StagedArtifacts {
    dir: PathBuf,
}

impl StagedArtifacts {
    /// Read artifacts staged under `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Staging root
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[async_trait]
impl ArtifactSource for StagedArtifacts {
    fn name(&self) -> &str {
        "staged"
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn collect(&self) -> Result<Vec<ArtifactDescriptor>> {
        if !self.dir.is_dir() {
            warn!(dir = %self.dir.display(), "artifact directory does not exist");
            return Ok(Vec::new());
        }

        let read_failed = |e: std::io::Error| ArtifactError::ReadFailed {
            path: self.dir.clone(),
            reason: e.to_string(),
        };

        let mut artifacts = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(read_failed)?;

        while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_hidden(&name) {
                continue;
            }

            let file_type = entry.file_type().await.map_err(read_failed)?;
            if file_type.is_dir() || file_type.is_file() {
                artifacts.push(ArtifactDescriptor::new(name, entry.path()));
            }
        }

        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        info!(count = artifacts.len(), "collected staged artifacts");
        Ok(artifacts)
    }
}

/// Expand artifacts into one candidate per regular file.
///
/// Directories are walked recursively; hidden files are skipped.
pub fn expand(artifacts: &[ArtifactDescriptor]) -> Result<Vec<AssetCandidate>> {
    let mut candidates = Vec::new();

    for artifact in artifacts {
        let walker = WalkDir::new(&artifact.local_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()));

        for entry in walker {
            let entry = entry.map_err(|e| ArtifactError::ReadFailed {
                path: artifact.local_path.clone(),
                reason: e.to_string(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = entry.metadata().map_err(|e| ArtifactError::ReadFailed {
                path: entry.path().to_path_buf(),
                reason: e.to_string(),
            })?;

            let file_name = entry.file_name().to_string_lossy().to_string();
            debug!(
                artifact = %artifact.name,
                file = %file_name,
                size = metadata.len(),
                "found file"
            );

            candidates.push(AssetCandidate {
                artifact: artifact.name.clone(),
                file_name,
                file_path: entry.path().to_path_buf(),
                size_bytes: metadata.len(),
                mime_type: mime::lookup(entry.path()).to_string(),
            });
        }
    }

    Ok(candidates)
}

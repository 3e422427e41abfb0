//! Artifacts of the current workflow run

use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};
use zip::ZipArchive;

use liftoff_core::error::ArtifactError;
use liftoff_core::traits::ArtifactSource;
use liftoff_core::types::ArtifactDescriptor;

use crate::client::GithubClient;
use crate::error::{GithubError, Result};

/// Downloads every artifact uploaded by the current Actions run
pub struct WorkflowRunArtifacts {
    client: Arc<GithubClient>,
    run_id: u64,
    download_dir: PathBuf,
}

impl WorkflowRunArtifacts {
    /// Create a source that extracts into `download_dir/<artifact name>/`
    pub fn new(client: Arc<GithubClient>, run_id: u64, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            run_id,
            download_dir: download_dir.into(),
        }
    }
}

#[async_trait]
impl ArtifactSource for WorkflowRunArtifacts {
    fn name(&self) -> &str {
        "workflow-run"
    }

    #[instrument(skip(self), fields(run_id = self.run_id, dir = %self.download_dir.display()))]
    async fn collect(&self) -> liftoff_core::Result<Vec<ArtifactDescriptor>> {
        let listed = self
            .client
            .list_run_artifacts(self.run_id)
            .await
            .map_err(|e| ArtifactError::DownloadFailed(e.to_string()))?;

        let mut descriptors = Vec::with_capacity(listed.len());
        for artifact in listed {
            if artifact.expired {
                warn!(artifact = %artifact.name, "skipping expired artifact");
                continue;
            }

            let archive = self
                .client
                .download_artifact(&artifact)
                .await
                .map_err(|e| e.into_artifact_error(&artifact.name))?;

            let target = self.download_dir.join(&artifact.name);
            let name = artifact.name.clone();
            let dest = target.clone();
            let files = tokio::task::spawn_blocking(move || extract_archive(&archive, &dest))
                .await
                .map_err(|e| ArtifactError::ExtractFailed {
                    name: name.clone(),
                    reason: e.to_string(),
                })?
                .map_err(|e| e.into_artifact_error(&name))?;

            info!(artifact = %artifact.name, files, "downloaded artifact");
            descriptors.push(ArtifactDescriptor::new(artifact.name, target));
        }

        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(descriptors)
    }
}

/// Extract a zip archive into `target`, returning the number of files written
///
/// Entries whose path would escape `target` are rejected.
pub fn extract_archive(bytes: &[u8], target: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    fs::create_dir_all(target)?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(GithubError::UnsafePath(entry.name().to_string()));
        };
        let out_path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        files += 1;
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_nested_files() {
        let temp = TempDir::new().unwrap();
        let bytes = archive(&[("app.deb", b"deb"), ("docs/README.md", b"readme")]);

        let target = temp.path().join("release_linux");
        let files = extract_archive(&bytes, &target).unwrap();

        assert_eq!(files, 2);
        assert_eq!(fs::read(target.join("app.deb")).unwrap(), b"deb");
        assert_eq!(fs::read(target.join("docs/README.md")).unwrap(), b"readme");
    }

    #[test]
    fn test_extract_rejects_escaping_entry() {
        let temp = TempDir::new().unwrap();
        let bytes = archive(&[("../evil.sh", b"boom")]);

        let result = extract_archive(&bytes, &temp.path().join("a"));

        assert!(matches!(result, Err(GithubError::UnsafePath(_))));
        assert!(!temp.path().join("evil.sh").exists());
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let result = extract_archive(b"not a zip", temp.path());
        assert!(matches!(result, Err(GithubError::Zip(_))));
    }
}

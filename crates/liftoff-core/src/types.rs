//! Core types for liftoff

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters of the release to create
///
/// Serializes to the create-release request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRequest {
    /// Tag the release is attached to
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Display title
    #[serde(rename = "name")]
    pub title: String,
    /// Rendered release notes
    pub body: String,
    /// Create as an unpublished draft
    pub draft: bool,
    /// Mark as a prerelease
    pub prerelease: bool,
    /// Commit the tag is created from when it does not exist yet
    #[serde(rename = "target_commitish")]
    pub target_commit: String,
}

impl ReleaseRequest {
    /// Create a new release request
    pub fn new(
        tag: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        target_commit: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            title: title.into(),
            body: body.into(),
            draft: false,
            prerelease: false,
            target_commit: target_commit.into(),
        }
    }

    /// Set the draft flag
    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }

    /// Set the prerelease flag
    pub fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }
}

/// A created release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseResult {
    /// Numeric release id
    pub id: u64,
    /// Public page of the release
    pub html_url: String,
    /// RFC 6570 template of the asset upload endpoint
    pub upload_url: String,
    /// Release name as stored by the API
    #[serde(default)]
    pub name: Option<String>,
    /// Creation time reported by the API
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An artifact staged by an earlier pipeline step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// Declared artifact name
    pub name: String,
    /// File or directory holding the artifact contents
    pub local_path: PathBuf,
}

impl ArtifactDescriptor {
    /// Create a new artifact descriptor
    pub fn new(name: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            local_path: local_path.into(),
        }
    }
}

/// A single file that may become a release asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCandidate {
    /// Name of the artifact the file belongs to
    pub artifact: String,
    /// Asset name (base file name)
    pub file_name: String,
    /// Location on disk
    pub file_path: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// Content type sent with the upload
    pub mime_type: String,
}

/// Asset record returned by the upload API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Asset id
    pub id: u64,
    /// Asset name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Public download link
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

/// Result of one upload attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    /// Asset name
    pub file_name: String,
    /// What happened
    pub status: UploadStatus,
}

/// Upload status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "detail")]
pub enum UploadStatus {
    /// Upload succeeded
    Uploaded(UploadedAsset),
    /// Upload failed; the run carries on
    Failed(String),
}

impl UploadOutcome {
    /// Check if the upload succeeded
    pub fn is_success(&self) -> bool {
        matches!(self.status, UploadStatus::Uploaded(_))
    }
}

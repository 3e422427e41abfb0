//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::assets::AssetPolicy;

use super::defaults::{
    DEFAULT_API_URL, DEFAULT_ARTIFACTS_DIR, DEFAULT_TAG_REF_PREFIX, DEFAULT_TIMEOUT_SECS,
    DEFAULT_UPLOAD_CONCURRENCY,
};

/// Main configuration for liftoff
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Release entry settings
    pub release: ReleaseConfig,

    /// Tag resolution settings
    pub tag: TagConfig,

    /// Which files become release assets
    pub assets: AssetPolicy,

    /// Where artifacts come from
    pub artifacts: ArtifactsConfig,

    /// Upload settings
    pub uploads: UploadsConfig,

    /// Releases API settings
    pub github: GithubConfig,
}

/// Release entry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Release title
    pub title: Option<String>,

    /// Path to the mustache template of the release body
    pub template: Option<PathBuf>,

    /// Create the release as a draft
    pub draft: bool,

    /// Mark the release as a prerelease
    pub prerelease: bool,
}

/// How the tag of the current build is found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagStrategy {
    /// Strip the tag namespace from the pipeline-supplied ref
    Ref,
    /// Ask the repository for tags pointing at the current commit
    #[default]
    Query,
}

impl TagStrategy {
    /// Returns the string representation of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ref => "ref",
            Self::Query => "query",
        }
    }
}

impl std::fmt::Display for TagStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TagStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ref" => Ok(Self::Ref),
            "query" | "git" => Ok(Self::Query),
            _ => Err(format!("Unknown tag strategy: {}", s)),
        }
    }
}

/// Tag resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// Resolution strategy
    pub strategy: TagStrategy,

    /// Namespace stripped from refs by the `ref` strategy
    pub ref_prefix: String,

    /// Fetch tag refs before querying (shallow checkouts omit them)
    pub fetch: bool,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            strategy: TagStrategy::default(),
            ref_prefix: DEFAULT_TAG_REF_PREFIX.to_string(),
            fetch: true,
        }
    }
}

/// Where artifacts are read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactSourceKind {
    /// A directory a previous step downloaded artifacts into
    #[default]
    Staged,
    /// The artifacts API of the current workflow run
    WorkflowRun,
}

impl ArtifactSourceKind {
    /// Returns the string representation of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staged => "staged",
            Self::WorkflowRun => "workflow-run",
        }
    }
}

impl std::fmt::Display for ArtifactSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ArtifactSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "staged" | "dir" => Ok(Self::Staged),
            "workflow-run" | "run" => Ok(Self::WorkflowRun),
            _ => Err(format!("Unknown artifact source: {}", s)),
        }
    }
}

/// Artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Artifact source
    pub source: ArtifactSourceKind,

    /// Staging directory (read by `staged`, written by `workflow-run`)
    pub dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            source: ArtifactSourceKind::default(),
            dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
        }
    }
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Maximum uploads in flight
    pub concurrency: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }
}

/// Releases API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API base URL
    pub api_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

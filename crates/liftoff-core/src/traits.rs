//! Seams between the release workflow and the outside world
//!
//! The workflow only talks to version control, the releases API, the
//! artifact store and the output channel through these traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    ArtifactDescriptor, AssetCandidate, ReleaseRequest, ReleaseResult, UploadedAsset,
};

/// Finds the tag of the build being released
pub trait TagResolver: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Tag name of the current commit, or `None` when it is not tagged
    fn resolve(&self) -> Result<Option<String>>;
}

/// Creates releases and attaches assets to them
#[async_trait]
pub trait ReleasePublisher: Send + Sync {
    /// Create a release. Each call creates a new release.
    async fn create_release(&self, request: &ReleaseRequest) -> Result<ReleaseResult>;

    /// Upload one file as an asset of an existing release
    async fn upload_asset(
        &self,
        release: &ReleaseResult,
        asset: &AssetCandidate,
    ) -> Result<UploadedAsset>;
}

/// Yields the artifacts staged by earlier pipeline steps
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// All artifacts of the current run, unfiltered
    async fn collect(&self) -> Result<Vec<ArtifactDescriptor>>;
}

/// Publishes values for downstream pipeline steps
pub trait OutputSink: Send + Sync {
    /// Publish one named value
    fn set_output(&self, key: &str, value: &str) -> Result<()>;
}

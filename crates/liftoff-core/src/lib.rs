//! liftoff Core - Core library for tag-driven release publishing
//!
//! This crate provides the error types, configuration, data model, release
//! body templating, asset selection and the release workflow. Version
//! control, the releases API and artifact downloads are reached through the
//! traits in [`traits`] and implemented by the sibling crates.

pub mod artifacts;
pub mod assets;
pub mod config;
pub mod error;
pub mod mime;
pub mod outputs;
pub mod template;
pub mod traits;
pub mod types;
pub mod workflow;

pub use artifacts::StagedArtifacts;
pub use assets::AssetPolicy;
pub use error::{LiftoffError, Result};
pub use outputs::{GithubOutputFile, MemoryOutputs};
pub use template::TemplateVariables;
pub use traits::{ArtifactSource, OutputSink, ReleasePublisher, TagResolver};
pub use types::{
    ArtifactDescriptor, AssetCandidate, ReleaseRequest, ReleaseResult, UploadOutcome,
    UploadStatus, UploadedAsset,
};
pub use workflow::{ReleaseOptions, ReleaseWorkflow, RunOutcome};

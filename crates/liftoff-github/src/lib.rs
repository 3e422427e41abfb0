//! liftoff GitHub - Releases API and workflow artifacts
//!
//! [`GithubClient`] creates releases and uploads assets, and
//! [`WorkflowRunArtifacts`] downloads the artifacts of the current
//! Actions run.

pub mod artifacts;
pub mod client;
pub mod error;

pub use artifacts::WorkflowRunArtifacts;
pub use client::{parse_repository, ClientConfig, GithubClient};
pub use error::{GithubError, Result};

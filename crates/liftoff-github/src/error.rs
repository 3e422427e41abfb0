//! GitHub error types

use std::path::PathBuf;

use liftoff_core::error::{ArtifactError, PublishError};
use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GithubError>;

/// GitHub-related errors
#[derive(Debug, Error)]
pub enum GithubError {
    /// Repository is not in `owner/repo` form
    #[error("Invalid repository '{0}', expected owner/repo")]
    InvalidRepository(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// API error from GitHub
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Asset file could not be read
    #[error("Failed to read asset {path}: {source}")]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive entry would land outside the target directory
    #[error("Unsafe path in archive: {0}")]
    UnsafePath(String),

    /// Zip error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<GithubError> for PublishError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::ApiError { status, message } => PublishError::Api { status, message },
            GithubError::AssetRead { path, source } => PublishError::AssetRead { path, source },
            GithubError::Http(e) => PublishError::Transport(e.to_string()),
            other => PublishError::InvalidResponse(other.to_string()),
        }
    }
}

impl GithubError {
    /// Convert into an artifact error for the named artifact
    pub fn into_artifact_error(self, name: &str) -> ArtifactError {
        match self {
            e @ (GithubError::Zip(_) | GithubError::UnsafePath(_) | GithubError::Io(_)) => {
                ArtifactError::ExtractFailed {
                    name: name.to_string(),
                    reason: e.to_string(),
                }
            }
            e => ArtifactError::DownloadFailed(format!("{}: {}", name, e)),
        }
    }
}

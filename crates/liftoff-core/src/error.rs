//! Error types for liftoff

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using LiftoffError
pub type Result<T> = std::result::Result<T, LiftoffError>;

/// Main error type for liftoff operations
#[derive(Debug, Error)]
pub enum LiftoffError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Template-related errors
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Releases API errors
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Artifact collection errors
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required input
    #[error("Missing required input: {0}")]
    MissingField(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Commit SHA could not be parsed or found
    #[error("Invalid commit: {0}")]
    InvalidCommit(String),

    /// git executable missing
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    /// Fetching tags failed
    #[error("Getting tag failed: {0}")]
    FetchFailed(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Template-related errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file could not be read
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed template
    #[error("Template syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Variables input was not a JSON object
    #[error("Invalid template variables: {0}")]
    InvalidVariables(String),
}

/// Releases API errors
#[derive(Debug, Error)]
pub enum PublishError {
    /// Non-success response from the API
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Asset file could not be read
    #[error("Failed to read asset {path}: {source}")]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Response could not be decoded or an upload URL was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Upload task panicked or was cancelled
    #[error("Upload task failed: {0}")]
    TaskFailed(String),
}

/// Artifact collection errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Listing or downloading artifacts failed
    #[error("Failed to download artifacts: {0}")]
    DownloadFailed(String),

    /// Archive could not be extracted
    #[error("Failed to extract artifact {name}: {reason}")]
    ExtractFailed { name: String, reason: String },

    /// Reading the staging directory failed
    #[error("Failed to read artifacts at {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LiftoffError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}

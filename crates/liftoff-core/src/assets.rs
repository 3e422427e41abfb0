//! Asset selection policies
//!
//! A deployment picks exactly one policy. Both decide inclusion from names
//! alone, so selection never touches the filesystem or the release.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{DEFAULT_ASSET_EXTENSIONS, DEFAULT_ASSET_PREFIX};
use crate::types::AssetCandidate;

fn default_prefix() -> String {
    DEFAULT_ASSET_PREFIX.to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_ASSET_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

/// Which staged files become release assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum AssetPolicy {
    /// Every file of an artifact whose name starts with `prefix`
    Prefix {
        #[serde(default = "default_prefix")]
        prefix: String,
    },
    /// Files whose name ends with one of `extensions` (ASCII case-insensitive)
    Extensions {
        #[serde(default = "default_extensions")]
        extensions: Vec<String>,
    },
}

impl Default for AssetPolicy {
    fn default() -> Self {
        Self::Prefix {
            prefix: default_prefix(),
        }
    }
}

impl AssetPolicy {
    /// Prefix policy with the given marker
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix {
            prefix: prefix.into(),
        }
    }

    /// Extension policy with the given allowlist
    pub fn extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Extensions {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Extension policy with the default installer/package formats
    pub fn default_extensions() -> Self {
        Self::Extensions {
            extensions: default_extensions(),
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Prefix { .. } => "prefix",
            Self::Extensions { .. } => "extensions",
        }
    }

    /// Decide whether a candidate is uploaded
    pub fn includes(&self, candidate: &AssetCandidate) -> bool {
        match self {
            Self::Prefix { prefix } => candidate.artifact.starts_with(prefix.as_str()),
            Self::Extensions { extensions } => {
                let name = candidate.file_name.to_ascii_lowercase();
                extensions
                    .iter()
                    .any(|ext| name.ends_with(&ext.to_ascii_lowercase()))
            }
        }
    }

    /// Split candidates into (included, skipped), keeping order
    ///
    /// Assets are keyed by file name on the release, so only the first
    /// included file of a given name is kept; later ones are skipped.
    pub fn partition(
        &self,
        candidates: Vec<AssetCandidate>,
    ) -> (Vec<AssetCandidate>, Vec<AssetCandidate>) {
        let mut seen = HashSet::new();
        let mut included = Vec::new();
        let mut skipped = Vec::new();

        for candidate in candidates {
            if !self.includes(&candidate) {
                debug!(
                    artifact = %candidate.artifact,
                    file = %candidate.file_name,
                    policy = self.kind(),
                    "skipping file"
                );
                skipped.push(candidate);
            } else if !seen.insert(candidate.file_name.clone()) {
                warn!(
                    artifact = %candidate.artifact,
                    file = %candidate.file_name,
                    path = %candidate.file_path.display(),
                    "another file already uses this asset name, skipping"
                );
                skipped.push(candidate);
            } else {
                included.push(candidate);
            }
        }

        (included, skipped)
    }
}

//! Types for git operations

use semver::Version;
use serde::Serialize;

/// A tag and the commit it resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    /// Tag name without the `refs/tags/` prefix
    pub name: String,
    /// Commit hash the tag peels to
    pub commit_hash: String,
    /// Whether the tag is an annotated tag object
    pub annotated: bool,
}

impl TagInfo {
    /// Create a new TagInfo
    pub fn new(name: impl Into<String>, commit_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_hash: commit_hash.into(),
            annotated: false,
        }
    }

    /// Mark as annotated
    pub fn annotated(mut self) -> Self {
        self.annotated = true;
        self
    }

    /// Semantic version carried by the name, if any
    pub fn version(&self) -> Option<Version> {
        parse_version(&self.name)
    }
}

/// Parse a tag name as a semantic version
///
/// Handles `1.2.3`, `v1.2.3` and `package@1.2.3`.
fn parse_version(tag: &str) -> Option<Version> {
    let tag = match tag.rfind('@') {
        Some(pos) => &tag[pos + 1..],
        None => tag,
    };
    let tag = tag
        .strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag);
    Version::parse(tag).ok()
}

//! Tag resolution strategies

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use liftoff_core::config::DEFAULT_TAG_REF_PREFIX;
use liftoff_core::traits::TagResolver;

use crate::remote::git_fetch_tags;
use crate::repository::GitRepo;
use crate::tags::pick_release_tag;

/// Resolve the tag from the ref the pipeline checked out
#[derive(Debug, Clone)]
pub struct RefTagResolver {
    git_ref: Option<String>,
    prefix: String,
}

impl RefTagResolver {
    /// Create a resolver for the given ref (e.g. `refs/tags/v1.2.0`)
    pub fn new(git_ref: Option<String>) -> Self {
        Self {
            git_ref,
            prefix: DEFAULT_TAG_REF_PREFIX.to_string(),
        }
    }

    /// Use a different tag namespace prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl TagResolver for RefTagResolver {
    fn name(&self) -> &str {
        "ref"
    }

    fn resolve(&self) -> liftoff_core::Result<Option<String>> {
        let tag = self
            .git_ref
            .as_deref()
            .and_then(|r| r.strip_prefix(self.prefix.as_str()))
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        debug!(git_ref = ?self.git_ref, tag = ?tag, "resolved tag from ref");
        Ok(tag)
    }
}

/// Resolve the tag by asking the repository which tags point at a commit
#[derive(Debug, Clone)]
pub struct QueryTagResolver {
    dir: PathBuf,
    commit: Option<String>,
    fetch: bool,
}

impl QueryTagResolver {
    /// Create a resolver for the repository containing `dir`
    ///
    /// `commit` defaults to `HEAD`.
    pub fn new(dir: impl Into<PathBuf>, commit: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            commit,
            fetch: true,
        }
    }

    /// Whether to fetch tag refs before querying
    pub fn with_fetch(mut self, fetch: bool) -> Self {
        self.fetch = fetch;
        self
    }
}

impl TagResolver for QueryTagResolver {
    fn name(&self) -> &str {
        "query"
    }

    #[instrument(skip(self), fields(dir = %self.dir.display(), fetch = self.fetch))]
    fn resolve(&self) -> liftoff_core::Result<Option<String>> {
        let repo = GitRepo::discover(&self.dir)?;
        if self.fetch {
            git_fetch_tags(repo.path())?;
        }

        let commit = match &self.commit {
            Some(sha) => repo.resolve_commit(sha)?,
            None => repo.head_commit()?.id(),
        };

        let tags = repo.tags_pointing_at(commit)?;
        let Some(chosen) = pick_release_tag(&tags) else {
            return Ok(None);
        };

        if tags.len() > 1 {
            let candidates: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
            info!(
                tag = %chosen.name,
                candidates = ?candidates,
                "several tags point at commit, using highest version"
            );
        }
        Ok(Some(chosen.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    #[test]
    fn test_ref_resolver() {
        let resolver = RefTagResolver::new(Some("refs/tags/v1.2.0".to_string()));
        assert_eq!(resolver.resolve().unwrap(), Some("v1.2.0".to_string()));
    }

    #[test]
    fn test_ref_resolver_branch_is_untagged() {
        let resolver = RefTagResolver::new(Some("refs/heads/main".to_string()));
        assert_eq!(resolver.resolve().unwrap(), None);
        assert_eq!(RefTagResolver::new(None).resolve().unwrap(), None);
        let bare = RefTagResolver::new(Some("refs/tags/".to_string()));
        assert_eq!(bare.resolve().unwrap(), None);
    }

    #[test]
    fn test_ref_resolver_custom_prefix() {
        let resolver = RefTagResolver::new(Some("refs/tags/release/2024.1".to_string()))
            .with_prefix("refs/tags/release/");
        assert_eq!(resolver.resolve().unwrap(), Some("2024.1".to_string()));
    }

    fn repo_with_commit() -> (TempDir, String) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
        (temp, oid.to_string())
    }

    fn tag(dir: &std::path::Path, name: &str) {
        let repo = Repository::open(dir).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.tag_lightweight(name, head.as_object(), false).unwrap();
    }

    #[test]
    fn test_query_resolver_untagged() {
        let (temp, sha) = repo_with_commit();
        let resolver = QueryTagResolver::new(temp.path(), Some(sha)).with_fetch(false);
        assert_eq!(resolver.resolve().unwrap(), None);
    }

    #[test]
    fn test_query_resolver_picks_highest_version() {
        let (temp, sha) = repo_with_commit();
        tag(temp.path(), "v1.2.0");
        tag(temp.path(), "v1.10.0");
        tag(temp.path(), "stable");

        let resolver = QueryTagResolver::new(temp.path(), Some(sha)).with_fetch(false);
        assert_eq!(resolver.resolve().unwrap(), Some("v1.10.0".to_string()));
    }

    #[test]
    fn test_query_resolver_defaults_to_head() {
        let (temp, _) = repo_with_commit();
        tag(temp.path(), "v0.1.0");

        let resolver = QueryTagResolver::new(temp.path(), None).with_fetch(false);
        assert_eq!(resolver.resolve().unwrap(), Some("v0.1.0".to_string()));
    }

    #[test]
    fn test_query_resolver_fetch_failure_is_fatal() {
        if which::which("git").is_err() {
            return;
        }
        let (temp, sha) = repo_with_commit();
        let resolver = QueryTagResolver::new(temp.path(), Some(sha));
        let err = resolver.resolve().unwrap_err();
        assert!(err.to_string().starts_with("Getting tag failed"));
    }
}

//! Git repository operations

use std::path::{Path, PathBuf};

use git2::{Oid, Repository};
use tracing::{debug, instrument};

use liftoff_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Git repository wrapper
pub struct GitRepo {
    pub(crate) repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at the given path
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening git repository");
        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RepositoryNotFound(path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Discover and open a repository by searching parent directories
    #[instrument(fields(start_path = %start_path.display()))]
    pub fn discover(start_path: &Path) -> Result<Self> {
        debug!(start_path = %start_path.display(), "discovering git repository");
        let repo = Repository::discover(start_path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::NotARepository(start_path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the HEAD commit
    pub fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let head = self.repo.head().map_err(GitError::Git2)?;
        head.peel_to_commit().map_err(GitError::Git2)
    }

    /// SHA of the HEAD commit
    pub fn head_sha(&self) -> Result<String> {
        Ok(self.head_commit()?.id().to_string())
    }

    /// Resolve a full or abbreviated commit SHA
    pub fn resolve_commit(&self, sha: &str) -> Result<Oid> {
        let object = self
            .repo
            .revparse_single(sha)
            .map_err(|_| GitError::InvalidCommit(sha.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| GitError::InvalidCommit(sha.to_string()))?;
        Ok(commit.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn init_repo_with_commit() -> (TempDir, GitRepo, Oid) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
        drop(tree);
        let repo = GitRepo::open(temp.path()).unwrap();
        (temp, repo, oid)
    }

    #[test]
    fn test_head_sha() {
        let (_temp, repo, oid) = init_repo_with_commit();
        assert_eq!(repo.head_sha().unwrap(), oid.to_string());
    }

    #[test]
    fn test_resolve_abbreviated_commit() {
        let (_temp, repo, oid) = init_repo_with_commit();
        let short = &oid.to_string()[..7];
        assert_eq!(repo.resolve_commit(short).unwrap(), oid);
    }

    #[test]
    fn test_resolve_unknown_commit() {
        let (_temp, repo, _) = init_repo_with_commit();
        let result = repo.resolve_commit("0123456789abcdef0123456789abcdef01234567");
        assert!(matches!(result, Err(GitError::InvalidCommit(_))));
    }

    #[test]
    fn test_discover_repo() {
        let (temp, _repo, _) = init_repo_with_commit();
        let subdir = temp.path().join("sub").join("dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let repo = GitRepo::discover(&subdir).unwrap();
        // Canonicalize both paths to handle macOS /var -> /private/var symlink
        let repo_path = repo.path().canonicalize().unwrap();
        let temp_path = temp.path().canonicalize().unwrap();
        assert_eq!(repo_path, temp_path);
    }

    #[test]
    fn test_not_a_repo() {
        let temp = TempDir::new().unwrap();
        let result = GitRepo::open(temp.path());
        assert!(result.is_err());
    }
}

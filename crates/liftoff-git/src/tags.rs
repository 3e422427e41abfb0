//! Tag operations

use git2::Oid;
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::TagInfo;

impl GitRepo {
    /// Get all tags, peeled to the commit they point at
    ///
    /// Tags that do not peel to a commit (e.g. a tag on a tree) are skipped.
    #[instrument(skip(self))]
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();

        self.repo.tag_foreach(|oid, name| {
            let name = String::from_utf8_lossy(name)
                .trim_start_matches("refs/tags/")
                .to_string();

            let Ok(object) = self.repo.find_object(oid, None) else {
                return true;
            };
            let annotated = object.as_tag().is_some();
            match object.peel_to_commit() {
                Ok(commit) => {
                    let info = TagInfo::new(&name, commit.id().to_string());
                    tags.push(if annotated { info.annotated() } else { info });
                }
                Err(e) => debug!(tag = %name, error = %e, "tag does not point at a commit"),
            }

            true
        })?;

        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }

    /// Tags whose peeled target is the given commit
    #[instrument(skip(self), fields(commit = %commit))]
    pub fn tags_pointing_at(&self, commit: Oid) -> Result<Vec<TagInfo>> {
        let commit = commit.to_string();
        let mut tags: Vec<_> = self
            .tags()?
            .into_iter()
            .filter(|t| t.commit_hash == commit)
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = tags.len(), "tags pointing at commit");
        Ok(tags)
    }
}

/// Pick the tag to release from the tags on a single commit
///
/// The highest semantic version wins. When no tag parses as a version the
/// lexicographically greatest name is used.
pub fn pick_release_tag(tags: &[TagInfo]) -> Option<&TagInfo> {
    let versioned = tags
        .iter()
        .filter_map(|t| t.version().map(|v| (t, v)))
        .max_by(|a, b| a.1.cmp(&b.1))
        .map(|(t, _)| t);

    versioned.or_else(|| tags.iter().max_by(|a, b| a.name.cmp(&b.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    fn commit(repo: &Repository, message: &str) -> Oid {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<_> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parents: Vec<_> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn setup_repo() -> (TempDir, Oid, Oid) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let first = commit(&repo, "first");
        let object = repo.find_object(first, None).unwrap();
        repo.tag_lightweight("v0.9.0", &object, false).unwrap();

        let second = commit(&repo, "second");
        let object = repo.find_object(second, None).unwrap();
        repo.tag_lightweight("v1.0.0", &object, false).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        repo.tag("v1.10.0", &object, &sig, "annotated", false)
            .unwrap();

        (temp, first, second)
    }

    #[test]
    fn test_list_tags() {
        let (temp, _, _) = setup_repo();
        let repo = GitRepo::open(temp.path()).unwrap();
        let tags = repo.tags().unwrap();
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_tags_pointing_at_commit() {
        let (temp, first, second) = setup_repo();
        let repo = GitRepo::open(temp.path()).unwrap();

        let tags = repo.tags_pointing_at(second).unwrap();
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["v1.0.0", "v1.10.0"]);
        assert!(tags[1].annotated);

        let tags = repo.tags_pointing_at(first).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "v0.9.0");
    }

    #[test]
    fn test_untagged_commit() {
        let (temp, _, _) = setup_repo();
        let raw = Repository::open(temp.path()).unwrap();
        let third = commit(&raw, "third");
        let repo = GitRepo::open(temp.path()).unwrap();
        assert!(repo.tags_pointing_at(third).unwrap().is_empty());
    }

    #[test]
    fn test_pick_highest_version() {
        let tags = vec![
            TagInfo::new("v1.10.0", "abc"),
            TagInfo::new("latest", "abc"),
            TagInfo::new("v1.9.0", "abc"),
        ];
        assert_eq!(pick_release_tag(&tags).unwrap().name, "v1.10.0");
    }

    #[test]
    fn test_pick_without_versions() {
        let tags = vec![TagInfo::new("alpha", "abc"), TagInfo::new("beta", "abc")];
        assert_eq!(pick_release_tag(&tags).unwrap().name, "beta");
        assert!(pick_release_tag(&[]).is_none());
    }
}

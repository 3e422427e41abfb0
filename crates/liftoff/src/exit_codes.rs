//! Exit codes for the CLI

use liftoff_core::error::{ConfigError, GitError, LiftoffError, TemplateError};
use liftoff_github::GithubError;

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Template error
pub const TEMPLATE_ERROR: i32 = 4;

/// Releases API error
pub const PUBLISH_ERROR: i32 = 5;

/// Artifact error
pub const ARTIFACT_ERROR: i32 = 6;

/// Exit code for a failed run
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<LiftoffError>() {
        Some(LiftoffError::Config(_)) => CONFIG_ERROR,
        Some(LiftoffError::Git(_)) => GIT_ERROR,
        Some(LiftoffError::Template(_)) => TEMPLATE_ERROR,
        Some(LiftoffError::Publish(_)) => PUBLISH_ERROR,
        Some(LiftoffError::Artifact(_)) => ARTIFACT_ERROR,
        Some(_) => ERROR,
        None if err.is::<ConfigError>() => CONFIG_ERROR,
        None if err.is::<GitError>() => GIT_ERROR,
        None if err.is::<TemplateError>() => TEMPLATE_ERROR,
        None if err.is::<GithubError>() => PUBLISH_ERROR,
        None => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftoff_core::error::PublishError;

    #[test]
    fn test_category_codes() {
        let err = anyhow::Error::new(LiftoffError::from(ConfigError::MissingField(
            "release.title".to_string(),
        )));
        assert_eq!(for_error(&err), CONFIG_ERROR);

        let err = anyhow::Error::new(LiftoffError::from(GitError::FetchFailed("x".to_string())));
        assert_eq!(for_error(&err), GIT_ERROR);

        let err = anyhow::Error::new(LiftoffError::from(PublishError::Transport("x".to_string())));
        assert_eq!(for_error(&err), PUBLISH_ERROR);
    }

    #[test]
    fn test_context_keeps_category() {
        let err = anyhow::Error::new(LiftoffError::from(GitError::InvalidCommit("abc".to_string())))
            .context("resolving tag");
        assert_eq!(for_error(&err), GIT_ERROR);
        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }

    #[test]
    fn test_bare_sub_errors() {
        let err = anyhow::Error::new(GithubError::InvalidRepository("nope".to_string()));
        assert_eq!(for_error(&err), PUBLISH_ERROR);

        let err = anyhow::Error::new(GitError::InvalidCommit("abc".to_string()));
        assert_eq!(for_error(&err), GIT_ERROR);
    }
}

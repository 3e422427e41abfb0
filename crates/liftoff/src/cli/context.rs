//! Pipeline context
//!
//! Everything the run needs from the CI environment is read once here and
//! passed down explicitly.

/// Environment of the current pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// `owner/repo`
    pub repository: Option<String>,
    /// Commit being built
    pub sha: Option<String>,
    /// Ref being built, e.g. `refs/tags/v1.2.0`
    pub git_ref: Option<String>,
    /// Releases API base URL
    pub api_url: Option<String>,
    /// Workflow run id
    pub run_id: Option<u64>,
    /// Token from `GITHUB_TOKEN`
    pub token: Option<String>,
}

impl RunContext {
    /// Read the context from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the context through `lookup`; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            repository: get("GITHUB_REPOSITORY"),
            sha: get("GITHUB_SHA"),
            git_ref: get("GITHUB_REF"),
            api_url: get("GITHUB_API_URL"),
            run_id: get("GITHUB_RUN_ID").and_then(|v| v.trim().parse().ok()),
            token: get("GITHUB_TOKEN"),
        }
    }
}

/// Read a boolean input; only the exact string `true` is true
pub fn input_flag(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) => Some(v == "true"),
    }
}

/// Treat an empty input as absent
pub fn input_value(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("GITHUB_REPOSITORY", "octo/hello"),
            ("GITHUB_SHA", "abc123"),
            ("GITHUB_REF", "refs/tags/v1.2.0"),
            ("GITHUB_RUN_ID", "4242"),
            ("GITHUB_API_URL", ""),
        ]
        .into_iter()
        .collect();

        let ctx = RunContext::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(ctx.repository.as_deref(), Some("octo/hello"));
        assert_eq!(ctx.sha.as_deref(), Some("abc123"));
        assert_eq!(ctx.git_ref.as_deref(), Some("refs/tags/v1.2.0"));
        assert_eq!(ctx.run_id, Some(4242));
        assert_eq!(ctx.api_url, None);
        assert_eq!(ctx.token, None);
    }

    #[test]
    fn test_input_flag() {
        assert_eq!(input_flag(Some("true")), Some(true));
        assert_eq!(input_flag(Some("True")), Some(false));
        assert_eq!(input_flag(Some("yes")), Some(false));
        assert_eq!(input_flag(Some("false")), Some(false));
        assert_eq!(input_flag(Some("")), None);
        assert_eq!(input_flag(None), None);
    }

    #[test]
    fn test_input_value() {
        let empty = "  ".to_string();
        let set = "v".to_string();
        assert_eq!(input_value(Some(&empty)), None);
        assert_eq!(input_value(Some(&set)), Some("v"));
    }
}

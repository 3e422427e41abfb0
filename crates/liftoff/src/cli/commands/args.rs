//! Arguments shared between commands

use std::path::Path;
use std::sync::Arc;

use clap::Args;

use liftoff_core::config::{Config, TagStrategy};
use liftoff_core::template::TemplateVariables;
use liftoff_core::traits::TagResolver;
use liftoff_core::Result;
use liftoff_git::{QueryTagResolver, RefTagResolver};

use crate::cli::context::{input_value, RunContext};

/// Template variable inputs
#[derive(Debug, Clone, Default, Args)]
pub struct VariablesArgs {
    /// Template variables as a JSON object
    #[arg(long, env = "INPUT_VARIABLES")]
    pub variables: Option<String>,

    /// Use the process environment as the template variables (ignores --variables)
    #[arg(long)]
    pub env_variables: bool,
}

impl VariablesArgs {
    /// Build the variable mapping
    pub fn load(&self) -> Result<TemplateVariables> {
        if self.env_variables {
            return Ok(TemplateVariables::from_env());
        }
        match input_value(self.variables.as_ref()) {
            Some(json) => Ok(TemplateVariables::from_json_str(json)?),
            None => Ok(TemplateVariables::default()),
        }
    }
}

/// Tag resolution inputs
#[derive(Debug, Clone, Default, Args)]
pub struct TagArgs {
    /// How to find the tag: `ref` (from --ref) or `query` (ask git)
    #[arg(long)]
    pub tag_strategy: Option<TagStrategy>,

    /// Ref being built (default: GITHUB_REF)
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    /// Commit being built (default: GITHUB_SHA, then HEAD)
    #[arg(long)]
    pub sha: Option<String>,

    /// Do not fetch tags before querying the repository
    #[arg(long)]
    pub no_fetch: bool,
}

impl TagArgs {
    /// Commit the run is for, if known without opening the repository
    pub fn sha(&self, ctx: &RunContext) -> Option<String> {
        self.sha.clone().or_else(|| ctx.sha.clone())
    }

    /// Build the configured tag resolver
    pub fn resolver(&self, config: &Config, ctx: &RunContext, dir: &Path) -> Arc<dyn TagResolver> {
        match self.tag_strategy.unwrap_or(config.tag.strategy) {
            TagStrategy::Ref => Arc::new(
                RefTagResolver::new(self.git_ref.clone().or_else(|| ctx.git_ref.clone()))
                    .with_prefix(&config.tag.ref_prefix),
            ),
            TagStrategy::Query => Arc::new(
                QueryTagResolver::new(dir, self.sha(ctx))
                    .with_fetch(config.tag.fetch && !self.no_fetch),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_variables_are_empty() {
        let args = VariablesArgs {
            variables: Some("  ".to_string()),
            env_variables: false,
        };
        assert!(args.load().unwrap().is_empty());
    }

    #[test]
    fn test_variables_must_be_object() {
        let args = VariablesArgs {
            variables: Some("[1, 2]".to_string()),
            env_variables: false,
        };
        assert!(args.load().is_err());
    }

    #[test]
    fn test_ref_strategy_uses_context_ref() {
        let args = TagArgs {
            tag_strategy: Some(TagStrategy::Ref),
            ..TagArgs::default()
        };
        let ctx = RunContext {
            git_ref: Some("refs/tags/v2.0.0".to_string()),
            ..RunContext::default()
        };
        let resolver = args.resolver(&Config::default(), &ctx, Path::new("."));
        assert_eq!(resolver.name(), "ref");
        assert_eq!(resolver.resolve().unwrap(), Some("v2.0.0".to_string()));
    }

    #[test]
    fn test_flag_ref_overrides_context() {
        let args = TagArgs {
            tag_strategy: Some(TagStrategy::Ref),
            git_ref: Some("refs/heads/main".to_string()),
            ..TagArgs::default()
        };
        let ctx = RunContext {
            git_ref: Some("refs/tags/v2.0.0".to_string()),
            ..RunContext::default()
        };
        let resolver = args.resolver(&Config::default(), &ctx, Path::new("."));
        assert_eq!(resolver.resolve().unwrap(), None);
    }

    #[test]
    fn test_default_strategy_is_query() {
        let resolver = TagArgs::default().resolver(
            &Config::default(),
            &RunContext::default(),
            Path::new("."),
        );
        assert_eq!(resolver.name(), "query");
    }
}

//! Release command

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use clap::Args;
use tracing::{debug, info, warn};

use liftoff_core::artifacts::StagedArtifacts;
use liftoff_core::assets::AssetPolicy;
use liftoff_core::config::{validate_config, ArtifactSourceKind, Config};
use liftoff_core::error::ConfigError;
use liftoff_core::outputs::{GithubOutputFile, MemoryOutputs};
use liftoff_core::traits::{ArtifactSource, OutputSink, ReleasePublisher, TagResolver};
use liftoff_core::types::{AssetCandidate, ReleaseRequest, ReleaseResult, UploadedAsset};
use liftoff_core::workflow::{ReleaseOptions, ReleaseWorkflow, RunOutcome};
use liftoff_core::LiftoffError;
use liftoff_github::{ClientConfig, GithubClient, WorkflowRunArtifacts};

use crate::cli::context::{input_flag, input_value, RunContext};
use crate::cli::{output, Cli};

use super::args::{TagArgs, VariablesArgs};

/// Create a release for the tagged commit and upload its assets
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    /// Mustache template of the release body
    #[arg(long, env = "INPUT_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Release title
    #[arg(long, env = "INPUT_TITLE")]
    pub title: Option<String>,

    #[command(flatten)]
    pub variables: VariablesArgs,

    /// Create the release as a draft (`true` to enable)
    #[arg(long, env = "INPUT_DRAFT")]
    pub draft: Option<String>,

    /// Mark the release as a prerelease (`true` to enable)
    #[arg(long, env = "INPUT_PRERELEASE")]
    pub prerelease: Option<String>,

    /// API token (default: GITHUB_TOKEN)
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository as owner/repo (default: GITHUB_REPOSITORY)
    #[arg(long)]
    pub repository: Option<String>,

    /// API base URL (default: GITHUB_API_URL, then the config file)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Workflow run whose artifacts are uploaded (default: GITHUB_RUN_ID)
    #[arg(long)]
    pub run_id: Option<u64>,

    #[command(flatten)]
    pub tag: TagArgs,

    /// Where artifacts come from
    #[arg(long)]
    pub artifact_source: Option<ArtifactSourceKind>,

    /// Staging directory for artifacts
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Upload every file of artifacts whose name starts with this prefix
    #[arg(long, conflicts_with = "asset_extension")]
    pub asset_prefix: Option<String>,

    /// Upload files with this extension (repeatable)
    #[arg(long = "asset-extension", value_delimiter = ',')]
    pub asset_extension: Vec<String>,

    /// Maximum uploads in flight
    #[arg(long)]
    pub upload_concurrency: Option<usize>,

    /// Resolve, render and filter without creating anything
    #[arg(long)]
    pub dry_run: bool,
}

impl ReleaseCommand {
    /// Execute the release command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            dry_run = self.dry_run,
            strategy = ?self.tag.tag_strategy,
            source = ?self.artifact_source,
            "executing release command"
        );
        let cwd = std::env::current_dir()?;
        let (mut config, config_path) = cli.load_config(&cwd)?;
        match &config_path {
            Some(path) => debug!(path = %path.display(), "using config file"),
            None => debug!("no config file, using defaults"),
        }
        self.apply_overrides(&mut config);
        validate_config(&config)?;

        let outcome = self.run(&config, &RunContext::from_env(), &cwd).await?;
        output::print_outcome(&outcome, cli.format, cli.quiet)
    }

    /// Resolve the tag, then read the release inputs and run the workflow.
    ///
    /// Nothing past the tag check is read on an untagged commit.
    async fn run(
        &self,
        config: &Config,
        ctx: &RunContext,
        cwd: &Path,
    ) -> anyhow::Result<RunOutcome> {
        let resolver = self.tag.resolver(config, ctx, cwd);
        let Some(tag) = resolver.resolve()? else {
            info!(strategy = resolver.name(), "No tag found");
            return Ok(RunOutcome::Untagged);
        };
        let tags: Arc<dyn TagResolver> = Arc::new(ResolvedTag {
            strategy: resolver.name().to_string(),
            tag,
        });

        let options = self.release_options(config, ctx, cwd)?;

        let client = if self.dry_run {
            None
        } else {
            Some(Arc::new(self.client(config, ctx)?))
        };

        let artifacts: Arc<dyn ArtifactSource> = match config.artifacts.source {
            ArtifactSourceKind::Staged => {
                Arc::new(StagedArtifacts::new(resolve_dir(cwd, &config.artifacts.dir)))
            }
            ArtifactSourceKind::WorkflowRun => {
                let run_id = self.run_id.or(ctx.run_id).ok_or_else(|| {
                    ConfigError::MissingField("run id (--run-id or GITHUB_RUN_ID)".to_string())
                })?;
                let client = match &client {
                    Some(client) => client.clone(),
                    None => Arc::new(self.client(config, ctx)?),
                };
                Arc::new(WorkflowRunArtifacts::new(
                    client,
                    run_id,
                    resolve_dir(cwd, &config.artifacts.dir),
                ))
            }
        };

        let outputs: Arc<dyn OutputSink> = match GithubOutputFile::from_env() {
            Some(file) => Arc::new(file),
            None => {
                debug!("GITHUB_OUTPUT not set, outputs only shown in the summary");
                Arc::new(MemoryOutputs::new())
            }
        };

        let publisher: Arc<dyn ReleasePublisher> = match client {
            Some(client) => client,
            None => Arc::new(DryRunPublisher),
        };

        let workflow = ReleaseWorkflow::new(options, tags, publisher, artifacts, outputs);
        Ok(workflow.execute().await?)
    }

    /// Fold command-line values into the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(strategy) = self.tag.tag_strategy {
            config.tag.strategy = strategy;
        }
        if self.tag.no_fetch {
            config.tag.fetch = false;
        }
        if let Some(source) = self.artifact_source {
            config.artifacts.source = source;
        }
        if let Some(dir) = &self.artifacts_dir {
            config.artifacts.dir = dir.clone();
        }
        if let Some(prefix) = &self.asset_prefix {
            config.assets = AssetPolicy::prefix(prefix);
        } else if !self.asset_extension.is_empty() {
            config.assets = AssetPolicy::extensions(self.asset_extension.iter().cloned());
        }
        if let Some(concurrency) = self.upload_concurrency {
            config.uploads.concurrency = concurrency;
        }
        if let Some(api_url) = &self.api_url {
            config.github.api_url = api_url.clone();
        }
    }

    fn release_options(
        &self,
        config: &Config,
        ctx: &RunContext,
        cwd: &Path,
    ) -> anyhow::Result<ReleaseOptions> {
        let title = input_value(self.title.as_ref())
            .map(str::to_string)
            .or_else(|| config.release.title.clone())
            .ok_or_else(|| {
                ConfigError::MissingField("title (--title or release.title)".to_string())
            })?;

        let template = self
            .template
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| config.release.template.clone())
            .ok_or_else(|| {
                ConfigError::MissingField("template (--template or release.template)".to_string())
            })?;

        let target_commit = match self.tag.sha(ctx) {
            Some(sha) => sha,
            None => head_sha(cwd)?,
        };

        let draft = input_flag(self.draft.as_deref()).unwrap_or(config.release.draft);
        let prerelease =
            input_flag(self.prerelease.as_deref()).unwrap_or(config.release.prerelease);

        Ok(ReleaseOptions::new(title, template, target_commit)
            .with_variables(self.variables.load()?)
            .with_flags(draft, prerelease)
            .with_policy(config.assets.clone())
            .with_upload_concurrency(config.uploads.concurrency)
            .with_dry_run(self.dry_run))
    }

    fn client(&self, config: &Config, ctx: &RunContext) -> anyhow::Result<GithubClient> {
        let token = input_value(self.token.as_ref())
            .map(str::to_string)
            .or_else(|| ctx.token.clone())
            .ok_or_else(|| {
                ConfigError::MissingField(
                    "token (--token, INPUT_TOKEN or GITHUB_TOKEN)".to_string(),
                )
            })?;
        let repository = self
            .repository
            .clone()
            .or_else(|| ctx.repository.clone())
            .ok_or_else(|| {
                ConfigError::MissingField(
                    "repository (--repository or GITHUB_REPOSITORY)".to_string(),
                )
            })?;

        // GITHUB_API_URL beats the file; an explicit --api-url was already folded in
        let api_url = match (&self.api_url, &ctx.api_url) {
            (None, Some(env_url)) => env_url.clone(),
            _ => config.github.api_url.clone(),
        };

        let client_config = ClientConfig::new(&repository, token)?
            .with_api_url(api_url)
            .with_timeout(Duration::from_secs(config.github.timeout_secs));
        let client = GithubClient::new(client_config)
            .with_context(|| format!("creating API client for {}", repository))?;
        Ok(client)
    }
}

/// Resolve a configured directory against the working directory
fn resolve_dir(cwd: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    }
}

fn head_sha(cwd: &Path) -> anyhow::Result<String> {
    let repo = liftoff_git::GitRepo::discover(cwd)?;
    let sha = repo.head_sha()?;
    warn!(sha = %sha, "no commit given, targeting HEAD");
    Ok(sha)
}

/// A tag that was already resolved before the release inputs were read
struct ResolvedTag {
    strategy: String,
    tag: String,
}

impl TagResolver for ResolvedTag {
    fn name(&self) -> &str {
        &self.strategy
    }

    fn resolve(&self) -> liftoff_core::Result<Option<String>> {
        Ok(Some(self.tag.clone()))
    }
}

/// Stands in for the API client during a dry run; the workflow never calls it
struct DryRunPublisher;

#[async_trait]
impl ReleasePublisher for DryRunPublisher {
    async fn create_release(
        &self,
        _request: &ReleaseRequest,
    ) -> liftoff_core::Result<ReleaseResult> {
        Err(LiftoffError::other("dry run does not create releases"))
    }

    async fn upload_asset(
        &self,
        _release: &ReleaseResult,
        _asset: &AssetCandidate,
    ) -> liftoff_core::Result<UploadedAsset> {
        Err(LiftoffError::other("dry run does not upload assets"))
    }
}

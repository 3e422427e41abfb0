//! Release workflow orchestration
//!
//! `TagCheck → Render → CreateRelease → EmitOutputs → CollectArtifacts →
//! Filter → Upload`. Everything up to and including release creation is
//! fatal on error; uploads are best-effort.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::artifacts::expand;
use crate::assets::AssetPolicy;
use crate::config::DEFAULT_UPLOAD_CONCURRENCY;
use crate::error::Result;
use crate::template::{render_file, TemplateVariables};
use crate::traits::{ArtifactSource, OutputSink, ReleasePublisher, TagResolver};
use crate::types::{AssetCandidate, ReleaseRequest, ReleaseResult, UploadOutcome};

use super::upload::upload_assets;

/// Options for a release run
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Release title
    pub title: String,
    /// Mustache template of the release body
    pub template: PathBuf,
    /// Template variables
    pub variables: TemplateVariables,
    /// Create as draft
    pub draft: bool,
    /// Mark as prerelease
    pub prerelease: bool,
    /// Commit the release targets
    pub target_commit: String,
    /// Which files become assets
    pub policy: AssetPolicy,
    /// Parallel uploads
    pub upload_concurrency: usize,
    /// Plan only, never call the releases API
    pub dry_run: bool,
}

impl ReleaseOptions {
    /// Create options with defaults for everything but the required inputs
    pub fn new(
        title: impl Into<String>,
        template: impl Into<PathBuf>,
        target_commit: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            template: template.into(),
            variables: TemplateVariables::default(),
            draft: false,
            prerelease: false,
            target_commit: target_commit.into(),
            policy: AssetPolicy::default(),
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            dry_run: false,
        }
    }

    /// Set template variables
    pub fn with_variables(mut self, variables: TemplateVariables) -> Self {
        self.variables = variables;
        self
    }

    /// Set the asset policy
    pub fn with_policy(mut self, policy: AssetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set upload concurrency
    pub fn with_upload_concurrency(mut self, concurrency: usize) -> Self {
        self.upload_concurrency = concurrency;
        self
    }

    /// Set draft/prerelease flags
    pub fn with_flags(mut self, draft: bool, prerelease: bool) -> Self {
        self.draft = draft;
        self.prerelease = prerelease;
        self
    }

    /// Enable dry run
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A completed release run
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    /// Tag the release was created for
    pub tag: String,
    /// The created release
    pub release: ReleaseResult,
    /// One entry per upload attempt
    pub uploads: Vec<UploadOutcome>,
    /// Files the asset policy left out
    pub skipped: Vec<AssetCandidate>,
    /// Wall time of the run
    pub duration_ms: u64,
}

impl ReleaseReport {
    /// Uploads that failed
    pub fn failed_uploads(&self) -> impl Iterator<Item = &UploadOutcome> {
        self.uploads.iter().filter(|u| !u.is_success())
    }
}

/// What a dry run would have done
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
    /// Release that would be created
    pub request: ReleaseRequest,
    /// Files that would be uploaded
    pub assets: Vec<AssetCandidate>,
    /// Files the asset policy leaves out
    pub skipped: Vec<AssetCandidate>,
}

/// How a run ended
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The current commit carries no tag; nothing was created
    Untagged,
    /// A release was created
    Released(ReleaseReport),
    /// Dry run; nothing was created
    Planned(ReleasePlan),
}

/// Strip a leading `v` from a tag to get a version string
pub fn version_from_tag(tag: &str) -> &str {
    match tag.strip_prefix('v').or_else(|| tag.strip_prefix('V')) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => tag,
    }
}

/// Execute a release run against the given collaborators
pub struct ReleaseWorkflow {
    options: ReleaseOptions,
    tags: Arc<dyn TagResolver>,
    publisher: Arc<dyn ReleasePublisher>,
    artifacts: Arc<dyn ArtifactSource>,
    outputs: Arc<dyn OutputSink>,
}

impl ReleaseWorkflow {
    /// Create a new release workflow
    pub fn new(
        options: ReleaseOptions,
        tags: Arc<dyn TagResolver>,
        publisher: Arc<dyn ReleasePublisher>,
        artifacts: Arc<dyn ArtifactSource>,
        outputs: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            options,
            tags,
            publisher,
            artifacts,
            outputs,
        }
    }

    /// Options the workflow runs with
    pub fn options(&self) -> &ReleaseOptions {
        &self.options
    }

    /// Execute the run
    #[instrument(
        skip(self),
        fields(
            tags = self.tags.name(),
            artifacts = self.artifacts.name(),
            dry_run = self.options.dry_run
        )
    )]
    pub async fn execute(&self) -> Result<RunOutcome> {
        let start = Instant::now();

        let Some(tag) = self.tags.resolve()? else {
            info!("No tag found");
            return Ok(RunOutcome::Untagged);
        };
        info!(tag = %tag, "using tag");

        let request = self.build_request(&tag)?;

        if self.options.dry_run {
            let (assets, skipped) = self.collect_candidates().await?;
            info!(
                assets = assets.len(),
                skipped = skipped.len(),
                "dry run - no release created"
            );
            return Ok(RunOutcome::Planned(ReleasePlan {
                request,
                assets,
                skipped,
            }));
        }

        let release = self.publisher.create_release(&request).await?;
        info!(
            id = release.id,
            url = %release.html_url,
            name = release.name.as_deref().unwrap_or(&request.title),
            "created release"
        );

        self.emit_outputs(&tag, &release)?;

        info!("collecting artifacts");
        let (assets, skipped) = self.collect_candidates().await?;

        let uploads = upload_assets(
            self.publisher.clone(),
            &release,
            assets,
            self.options.upload_concurrency,
        )
        .await;

        let report = ReleaseReport {
            tag,
            release,
            uploads,
            skipped,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        let failed = report.failed_uploads().count();
        if failed > 0 {
            warn!(
                failed,
                total = report.uploads.len(),
                "release created with missing assets"
            );
        }
        info!(
            uploaded = report.uploads.len() - failed,
            skipped = report.skipped.len(),
            duration_ms = report.duration_ms,
            "release complete"
        );

        Ok(RunOutcome::Released(report))
    }

    fn build_request(&self, tag: &str) -> Result<ReleaseRequest> {
        let mut variables = self.options.variables.clone();
        variables.insert_default("tag", tag);
        variables.insert_default("version", version_from_tag(tag));

        let body = render_file(&self.options.template, &variables)?;
        info!(template = %self.options.template.display(), "Rendered body");

        Ok(
            ReleaseRequest::new(tag, &self.options.title, body, &self.options.target_commit)
                .with_draft(self.options.draft)
                .with_prerelease(self.options.prerelease),
        )
    }

    fn emit_outputs(&self, tag: &str, release: &ReleaseResult) -> Result<()> {
        self.outputs.set_output("id", &release.id.to_string())?;
        self.outputs.set_output("url", &release.html_url)?;
        self.outputs.set_output("upload_url", &release.upload_url)?;
        self.outputs.set_output("tag", tag)?;
        Ok(())
    }

    async fn collect_candidates(&self) -> Result<(Vec<AssetCandidate>, Vec<AssetCandidate>)> {
        let artifacts = self.artifacts.collect().await?;
        let candidates = expand(&artifacts)?;
        info!(
            artifacts = artifacts.len(),
            files = candidates.len(),
            policy = self.options.policy.kind(),
            "filtering artifacts"
        );
        Ok(self.options.policy.partition(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GitError, LiftoffError, PublishError};
    use crate::outputs::MemoryOutputs;
    use crate::types::{ArtifactDescriptor, UploadStatus, UploadedAsset};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FixedTag(Option<&'static str>);

    impl TagResolver for FixedTag {
        fn name(&self) -> &str {
            "fixed"
        }

        fn resolve(&self) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct BrokenTag;

    impl TagResolver for BrokenTag {
        fn name(&self) -> &str {
            "broken"
        }

        fn resolve(&self) -> Result<Option<String>> {
            Err(GitError::FetchFailed("fatal: could not read from remote".to_string()).into())
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        fail_create: bool,
        fail_uploads: HashSet<String>,
        created: Mutex<Vec<ReleaseRequest>>,
        uploaded: Mutex<Vec<String>>,
    }

    impl RecordingPublisher {
        fn failing_upload(name: &str) -> Self {
            Self {
                fail_uploads: [name.to_string()].into_iter().collect(),
                ..Self::default()
            }
        }

        fn created(&self) -> Vec<ReleaseRequest> {
            self.created.lock().unwrap().clone()
        }

        fn uploaded(&self) -> Vec<String> {
            let mut names = self.uploaded.lock().unwrap().clone();
            names.sort();
            names
        }
    }

    #[async_trait]
    impl ReleasePublisher for RecordingPublisher {
        async fn create_release(&self, request: &ReleaseRequest) -> Result<ReleaseResult> {
            self.created.lock().unwrap().push(request.clone());
            if self.fail_create {
                return Err(PublishError::Api {
                    status: 422,
                    message: "already_exists".to_string(),
                }
                .into());
            }
            Ok(ReleaseResult {
                id: 99,
                html_url: "https://github.com/o/r/releases/tag/v1.2.0".to_string(),
                upload_url: "https://uploads.github.com/repos/o/r/releases/99/assets{?name,label}"
                    .to_string(),
                name: Some(request.title.clone()),
                created_at: None,
            })
        }

        async fn upload_asset(
            &self,
            release: &ReleaseResult,
            asset: &AssetCandidate,
        ) -> Result<UploadedAsset> {
            assert_eq!(release.id, 99);
            self.uploaded.lock().unwrap().push(asset.file_name.clone());
            if self.fail_uploads.contains(&asset.file_name) {
                return Err(PublishError::Transport("connection reset".to_string()).into());
            }
            Ok(UploadedAsset {
                id: 1,
                name: asset.file_name.clone(),
                size: asset.size_bytes,
                browser_download_url: None,
            })
        }
    }

    struct FixedArtifacts(Vec<ArtifactDescriptor>);

    #[async_trait]
    impl ArtifactSource for FixedArtifacts {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn collect(&self) -> Result<Vec<ArtifactDescriptor>> {
            Ok(self.0.clone())
        }
    }

    struct Fixture {
        _temp: TempDir,
        template: PathBuf,
        artifacts: Vec<ArtifactDescriptor>,
    }

    fn fixture(template: &str) -> Fixture {
        let temp = TempDir::new().unwrap();
        let template_path = temp.path().join("RELEASE.md");
        std::fs::write(&template_path, template).unwrap();

        let bundle = temp.path().join("bundle");
        std::fs::create_dir_all(&bundle).unwrap();
        std::fs::write(bundle.join("app.deb"), b"deb").unwrap();
        std::fs::write(bundle.join("notes.txt"), b"notes").unwrap();
        std::fs::write(bundle.join("app.rpm"), b"rpm").unwrap();

        Fixture {
            artifacts: vec![ArtifactDescriptor::new("bundle", &bundle)],
            template: template_path,
            _temp: temp,
        }
    }

    fn workflow(
        options: ReleaseOptions,
        tags: Arc<dyn TagResolver>,
        publisher: Arc<RecordingPublisher>,
        artifacts: Vec<ArtifactDescriptor>,
        outputs: Arc<MemoryOutputs>,
    ) -> ReleaseWorkflow {
        ReleaseWorkflow::new(
            options,
            tags,
            publisher,
            Arc::new(FixedArtifacts(artifacts)),
            outputs,
        )
    }

    #[tokio::test]
    async fn test_untagged_creates_nothing() {
        let fx = fixture("body");
        let publisher = Arc::new(RecordingPublisher::default());
        let outputs = Arc::new(MemoryOutputs::new());

        let outcome = workflow(
            ReleaseOptions::new("Title", &fx.template, "abc"),
            Arc::new(FixedTag(None)),
            publisher.clone(),
            fx.artifacts.clone(),
            outputs.clone(),
        )
        .execute()
        .await
        .unwrap();

        assert!(matches!(outcome, RunOutcome::Untagged));
        assert!(publisher.created().is_empty());
        assert!(outputs.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_release_scenario() {
        let fx = fixture("Release {{version}}");
        let publisher = Arc::new(RecordingPublisher::default());
        let outputs = Arc::new(MemoryOutputs::new());
        let variables = TemplateVariables::from_json_str(r#"{"version":"1.2.0"}"#).unwrap();

        let outcome = workflow(
            ReleaseOptions::new("v1.2.0", &fx.template, "abc123").with_variables(variables),
            Arc::new(FixedTag(Some("v1.2.0"))),
            publisher.clone(),
            fx.artifacts.clone(),
            outputs.clone(),
        )
        .execute()
        .await
        .unwrap();

        let created = publisher.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].tag, "v1.2.0");
        assert_eq!(created[0].body, "Release 1.2.0");
        assert_eq!(created[0].target_commit, "abc123");
        assert!(matches!(outcome, RunOutcome::Released(_)));
        assert_eq!(outputs.get("id"), Some("99".to_string()));
    }

    #[tokio::test]
    async fn test_builtin_tag_variables() {
        let fx = fixture("{{tag}} / {{version}}");
        let publisher = Arc::new(RecordingPublisher::default());

        workflow(
            ReleaseOptions::new("t", &fx.template, "abc"),
            Arc::new(FixedTag(Some("v2.0.0-rc.1"))),
            publisher.clone(),
            Vec::new(),
            Arc::new(MemoryOutputs::new()),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(publisher.created()[0].body, "v2.0.0-rc.1 / 2.0.0-rc.1");
    }

    #[tokio::test]
    async fn test_extension_policy_scenario() {
        let fx = fixture("body");
        let publisher = Arc::new(RecordingPublisher::default());

        let outcome = workflow(
            ReleaseOptions::new("t", &fx.template, "abc")
                .with_policy(AssetPolicy::extensions([".deb"])),
            Arc::new(FixedTag(Some("v1.0.0"))),
            publisher.clone(),
            fx.artifacts.clone(),
            Arc::new(MemoryOutputs::new()),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(publisher.uploaded(), vec!["app.deb"]);
        let RunOutcome::Released(report) = outcome else {
            panic!("expected a release");
        };
        let skipped: Vec<_> = report.skipped.iter().map(|c| c.file_name.as_str()).collect();
        assert_eq!(skipped, vec!["app.rpm", "notes.txt"]);
    }

    #[tokio::test]
    async fn test_prefix_policy_skips_unmarked_artifact() {
        let fx = fixture("body");
        let publisher = Arc::new(RecordingPublisher::default());

        workflow(
            ReleaseOptions::new("t", &fx.template, "abc")
                .with_policy(AssetPolicy::prefix("release_")),
            Arc::new(FixedTag(Some("v1.0.0"))),
            publisher.clone(),
            fx.artifacts.clone(),
            Arc::new(MemoryOutputs::new()),
        )
        .execute()
        .await
        .unwrap();

        assert!(publisher.uploaded().is_empty());
    }

    #[tokio::test]
    async fn test_prefix_policy_uploads_every_file() {
        let fx = fixture("body");
        let artifacts: Vec<_> = fx
            .artifacts
            .iter()
            .map(|a| ArtifactDescriptor::new("release_bundle", &a.local_path))
            .collect();
        let publisher = Arc::new(RecordingPublisher::default());

        workflow(
            ReleaseOptions::new("t", &fx.template, "abc"),
            Arc::new(FixedTag(Some("v1.0.0"))),
            publisher.clone(),
            artifacts,
            Arc::new(MemoryOutputs::new()),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(publisher.uploaded(), vec!["app.deb", "app.rpm", "notes.txt"]);
    }

    #[tokio::test]
    async fn test_upload_failure_is_not_fatal() {
        let fx = fixture("body");
        let publisher = Arc::new(RecordingPublisher::failing_upload("app.deb"));
        let outputs = Arc::new(MemoryOutputs::new());

        let outcome = workflow(
            ReleaseOptions::new("t", &fx.template, "abc")
                .with_policy(AssetPolicy::extensions([".deb", ".rpm"]))
                .with_upload_concurrency(1),
            Arc::new(FixedTag(Some("v1.0.0"))),
            publisher.clone(),
            fx.artifacts.clone(),
            outputs.clone(),
        )
        .execute()
        .await
        .unwrap();

        // app.deb fails first; app.rpm is still attempted
        assert_eq!(publisher.uploaded(), vec!["app.deb", "app.rpm"]);
        let RunOutcome::Released(report) = outcome else {
            panic!("expected a release");
        };
        assert_eq!(report.failed_uploads().count(), 1);
        assert!(matches!(
            report.uploads[0].status,
            UploadStatus::Failed(ref msg) if msg.contains("connection reset")
        ));
        assert_eq!(outputs.get("id"), Some("99".to_string()));
        assert_eq!(
            outputs.get("url"),
            Some("https://github.com/o/r/releases/tag/v1.2.0".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_template_is_fatal_before_release() {
        let fx = fixture("body");
        let publisher = Arc::new(RecordingPublisher::default());

        let result = workflow(
            ReleaseOptions::new("t", fx.template.with_file_name("absent.md"), "abc"),
            Arc::new(FixedTag(Some("v1.0.0"))),
            publisher.clone(),
            Vec::new(),
            Arc::new(MemoryOutputs::new()),
        )
        .execute()
        .await;

        assert!(matches!(result, Err(LiftoffError::Template(_))));
        assert!(publisher.created().is_empty());
    }

    #[tokio::test]
    async fn test_tag_error_is_fatal() {
        let fx = fixture("body");
        let publisher = Arc::new(RecordingPublisher::default());

        let result = workflow(
            ReleaseOptions::new("t", &fx.template, "abc"),
            Arc::new(BrokenTag),
            publisher.clone(),
            Vec::new(),
            Arc::new(MemoryOutputs::new()),
        )
        .execute()
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("Getting tag failed"));
        assert!(publisher.created().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_stops_before_artifacts() {
        let fx = fixture("body");
        let publisher = Arc::new(RecordingPublisher {
            fail_create: true,
            ..RecordingPublisher::default()
        });
        let outputs = Arc::new(MemoryOutputs::new());

        let result = workflow(
            ReleaseOptions::new("t", &fx.template, "abc")
                .with_policy(AssetPolicy::default_extensions()),
            Arc::new(FixedTag(Some("v1.0.0"))),
            publisher.clone(),
            fx.artifacts.clone(),
            outputs.clone(),
        )
        .execute()
        .await;

        assert!(matches!(result, Err(LiftoffError::Publish(_))));
        assert_eq!(publisher.created().len(), 1);
        assert!(publisher.uploaded().is_empty());
        assert!(outputs.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_plans_without_calling_api() {
        let fx = fixture("Release {{version}}");
        let publisher = Arc::new(RecordingPublisher::default());

        let outcome = workflow(
            ReleaseOptions::new("t", &fx.template, "abc")
                .with_policy(AssetPolicy::extensions([".deb"]))
                .with_dry_run(true),
            Arc::new(FixedTag(Some("v3.1.0"))),
            publisher.clone(),
            fx.artifacts.clone(),
            Arc::new(MemoryOutputs::new()),
        )
        .execute()
        .await
        .unwrap();

        assert!(publisher.created().is_empty());
        let RunOutcome::Planned(plan) = outcome else {
            panic!("expected a plan");
        };
        assert_eq!(plan.request.body, "Release 3.1.0");
        assert_eq!(plan.assets.len(), 1);
        assert_eq!(plan.skipped.len(), 2);
    }

    #[test]
    fn test_version_from_tag() {
        assert_eq!(version_from_tag("v1.2.0"), "1.2.0");
        assert_eq!(version_from_tag("1.2.0"), "1.2.0");
        assert_eq!(version_from_tag("viper"), "viper");
    }
}

//! GitHub REST API client
//!
//! Covers the three calls a release run needs: creating a release, uploading
//! release assets and listing/downloading the artifacts of an Actions run.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE,
};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use url::Url;

use liftoff_core::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use liftoff_core::error::PublishError;
use liftoff_core::traits::ReleasePublisher;
use liftoff_core::types::{AssetCandidate, ReleaseRequest, ReleaseResult, UploadedAsset};

use crate::error::{GithubError, Result};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("liftoff/", env!("CARGO_PKG_VERSION"));
const ARTIFACTS_PER_PAGE: usize = 100;

/// Connection settings for [`GithubClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (`https://api.github.com` or a GitHub Enterprise URL)
    pub api_url: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Access token
    pub token: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config for `owner/repo` against the public API
    pub fn new(repository: &str, token: impl Into<String>) -> Result<Self> {
        let (owner, repo) = parse_repository(repository)?;
        Ok(Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner,
            repo,
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Use a different API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Split `owner/repo` into its parts
pub fn parse_repository(repository: &str) -> Result<(String, String)> {
    match repository.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GithubError::InvalidRepository(repository.to_string())),
    }
}

/// Build the upload URL for an asset from a release's `upload_url` template
///
/// The template carries an RFC 6570 suffix such as `{?name,label}` which is
/// dropped before `name` is added as a query parameter.
pub fn asset_upload_url(template: &str, file_name: &str) -> Result<Url> {
    let base = match template.find('{') {
        Some(pos) => &template[..pos],
        None => template,
    };
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("name", file_name);
    Ok(url)
}

/// Pull a readable message out of a GitHub error body
///
/// Validation failures put the useful detail in `errors[]`.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        #[serde(default)]
        errors: Vec<serde_json::Value>,
    }

    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return body.trim().to_string();
    };

    let details: Vec<String> = parsed
        .errors
        .iter()
        .filter_map(|e| match e {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(map) => map
                .get("message")
                .or_else(|| map.get("code"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        })
        .collect();

    let message = parsed.message.unwrap_or_else(|| body.trim().to_string());
    if details.is_empty() {
        message
    } else {
        format!("{} ({})", message, details.join(", "))
    }
}

/// An artifact of a workflow run
#[derive(Debug, Clone, Deserialize)]
pub struct RunArtifact {
    /// Artifact id
    pub id: u64,
    /// Artifact name
    pub name: String,
    /// Archive size
    #[serde(default)]
    pub size_in_bytes: u64,
    /// Whether the artifact has passed its retention period
    #[serde(default)]
    pub expired: bool,
    /// Zip download endpoint
    pub archive_download_url: String,
}

#[derive(Debug, Deserialize)]
struct ArtifactPage {
    total_count: usize,
    artifacts: Vec<RunArtifact>,
}

/// GitHub REST API client
pub struct GithubClient {
    /// Configuration
    config: ClientConfig,

    /// HTTP client
    client: Client,
}

impl GithubClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(GithubError::ConfigurationError(
                "a token is required".to_string(),
            ));
        }
        Url::parse(&config.api_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| {
                GithubError::ConfigurationError("token is not a valid header".to_string())
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    /// Repository as `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.config.owner, self.config.repo)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            path
        )
    }

    /// Make an API request and decode the JSON response
    async fn api_request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("Making {} request to {}", method, url);

        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GithubError::ApiError {
                status: status.as_u16(),
                message: error_message(&error_text),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GithubError::InvalidResponse(e.to_string()))
    }

    /// Create a release
    #[instrument(skip(self, request), fields(repo = %self.repository(), tag = %request.tag))]
    pub async fn create_release(&self, request: &ReleaseRequest) -> Result<ReleaseResult> {
        let start = Instant::now();
        let release: ReleaseResult = self
            .api_request(Method::POST, &self.endpoint("/releases"), Some(request))
            .await?;
        info!(
            id = release.id,
            duration_ms = start.elapsed().as_millis(),
            "release created"
        );
        Ok(release)
    }

    /// Upload one file to a release
    #[instrument(
        skip(self, release, asset),
        fields(release_id = release.id, file = %asset.file_name)
    )]
    pub async fn upload_asset(
        &self,
        release: &ReleaseResult,
        asset: &AssetCandidate,
    ) -> Result<UploadedAsset> {
        let url = asset_upload_url(&release.upload_url, &asset.file_name)?;
        let content = tokio::fs::read(&asset.file_path)
            .await
            .map_err(|source| GithubError::AssetRead {
                path: asset.file_path.clone(),
                source,
            })?;

        let start = Instant::now();
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, asset.mime_type.as_str())
            .header(CONTENT_LENGTH, content.len())
            .body(content)
            .send()
            .await?;
        let uploaded: UploadedAsset = Self::decode(response).await?;

        debug!(
            asset_id = uploaded.id,
            size = uploaded.size,
            duration_ms = start.elapsed().as_millis(),
            "asset upload finished"
        );
        Ok(uploaded)
    }

    /// List the artifacts of a workflow run
    #[instrument(skip(self), fields(repo = %self.repository()))]
    pub async fn list_run_artifacts(&self, run_id: u64) -> Result<Vec<RunArtifact>> {
        let mut artifacts = Vec::new();
        let mut page = 1;

        loop {
            let url = self.endpoint(&format!(
                "/actions/runs/{}/artifacts?per_page={}&page={}",
                run_id, ARTIFACTS_PER_PAGE, page
            ));
            let batch: ArtifactPage = self.api_request::<_, ()>(Method::GET, &url, None).await?;
            let received = batch.artifacts.len();
            artifacts.extend(batch.artifacts);

            if received < ARTIFACTS_PER_PAGE || artifacts.len() >= batch.total_count {
                break;
            }
            page += 1;
        }

        debug!(count = artifacts.len(), "listed run artifacts");
        Ok(artifacts)
    }

    /// Download an artifact archive
    #[instrument(
        skip(self, artifact),
        fields(artifact = %artifact.name, size = artifact.size_in_bytes)
    )]
    pub async fn download_artifact(&self, artifact: &RunArtifact) -> Result<Vec<u8>> {
        let start = Instant::now();
        let response = self
            .client
            .get(&artifact.archive_download_url)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GithubError::ApiError {
                status: status.as_u16(),
                message: error_message(&error_text),
            });
        }

        let bytes = response.bytes().await?;
        debug!(
            bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis(),
            "downloaded artifact"
        );
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ReleasePublisher for GithubClient {
    async fn create_release(
        &self,
        request: &ReleaseRequest,
    ) -> liftoff_core::Result<ReleaseResult> {
        GithubClient::create_release(self, request)
            .await
            .map_err(|e| PublishError::from(e).into())
    }

    async fn upload_asset(
        &self,
        release: &ReleaseResult,
        asset: &AssetCandidate,
    ) -> liftoff_core::Result<UploadedAsset> {
        GithubClient::upload_asset(self, release, asset)
            .await
            .map_err(|e| PublishError::from(e).into())
    }
}

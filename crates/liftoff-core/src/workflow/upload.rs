//! Best-effort asset uploads

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::error::{PublishError, Result};
use crate::traits::ReleasePublisher;
use crate::types::{AssetCandidate, ReleaseResult, UploadOutcome, UploadStatus, UploadedAsset};

enum Pending {
    Spawned(JoinHandle<Result<UploadedAsset>>),
    NotStarted(String),
}

fn failed(file_name: String, message: String) -> UploadOutcome {
    warn!(file = %file_name, error = %message, "failed to upload asset");
    UploadOutcome {
        file_name,
        status: UploadStatus::Failed(message),
    }
}

/// Upload every asset to the release, at most `concurrency` at a time.
///
/// Each upload runs as its own task and all tasks are joined before this
/// returns. A failing upload is recorded and logged; it never stops the
/// others. Outcomes are returned in input order.
#[instrument(
    skip_all,
    fields(release_id = release.id, count = assets.len(), concurrency = concurrency)
)]
pub async fn upload_assets(
    publisher: Arc<dyn ReleasePublisher>,
    release: &ReleaseResult,
    assets: Vec<AssetCandidate>,
    concurrency: usize,
) -> Vec<UploadOutcome> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let release = Arc::new(release.clone());
    let mut pending = Vec::with_capacity(assets.len());

    for asset in assets {
        let file_name = asset.file_name.clone();
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                pending.push((file_name, Pending::NotStarted(e.to_string())));
                continue;
            }
        };

        let publisher = publisher.clone();
        let release = release.clone();
        let handle = tokio::spawn(async move {
            info!(file = %asset.file_name, size = asset.size_bytes, "uploading asset");
            let result = publisher.upload_asset(&release, &asset).await;
            drop(permit);
            result
        });
        pending.push((file_name, Pending::Spawned(handle)));
    }

    let mut outcomes = Vec::with_capacity(pending.len());
    for (file_name, task) in pending {
        let outcome = match task {
            Pending::Spawned(handle) => match handle.await {
                Ok(Ok(asset)) => {
                    info!(file = %file_name, asset_id = asset.id, "uploaded asset");
                    UploadOutcome {
                        file_name,
                        status: UploadStatus::Uploaded(asset),
                    }
                }
                Ok(Err(e)) => failed(file_name, e.to_string()),
                Err(e) => failed(file_name, PublishError::TaskFailed(e.to_string()).to_string()),
            },
            Pending::NotStarted(reason) => {
                failed(file_name, PublishError::TaskFailed(reason).to_string())
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

//! Batch upload scheduling with bounded concurrency.
//!
//! Tasks run in fixed-size batches: every task in a batch runs
//! concurrently, and batch N+1 never starts before batch N fully
//! resolves. This bounds in-flight connections and gives
//! deterministic fail-within-batch diagnostics.

use std::sync::Arc;

use siteforge_aws::AwsCli;
use tokio::task::JoinSet;
use tracing::info;

use crate::error::DeployError;
use crate::types::{UploadSummary, UploadTask};
use crate::uploader::upload_one;

/// Maximum simultaneous in-flight uploads.
pub const CONCURRENCY_LIMIT: usize = 10;

/// Uploads all tasks to `bucket` in sequential batches of
/// [`CONCURRENCY_LIMIT`].
///
/// Fail-fast: any failure within a batch aborts the remaining batches
/// and the whole run fails with the aggregate attached. Nothing
/// already uploaded is rolled back; re-running is safe because object
/// puts are idempotent overwrites.
pub async fn upload_all(
    cli: Arc<dyn AwsCli>,
    bucket: &str,
    tasks: Vec<UploadTask>,
) -> Result<UploadSummary, DeployError> {
    let total = tasks.len();
    let mut summary = UploadSummary::default();

    info!(files = total, bucket = %bucket, "starting upload");

    let mut batches = tasks.into_iter().peekable();
    while batches.peek().is_some() {
        let batch: Vec<UploadTask> = batches.by_ref().take(CONCURRENCY_LIMIT).collect();

        let mut set = JoinSet::new();
        for task in batch {
            let cli = Arc::clone(&cli);
            let bucket = bucket.to_string();
            set.spawn(async move { upload_one(cli.as_ref(), &bucket, &task).await });
        }

        while let Some(joined) = set.join_next().await {
            let result = joined.map_err(|e| DeployError::Join(e.to_string()))?;
            summary.record(result);
        }

        info!(uploaded = summary.succeeded, total, "upload progress");

        if !summary.is_success() {
            return Err(DeployError::UploadsFailed(summary));
        }
    }

    info!(
        uploaded = summary.succeeded,
        gzipped = summary.gzipped,
        "upload complete"
    );
    Ok(summary)
}

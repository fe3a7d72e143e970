//! Single-object upload: optional gzip, one atomic put, temp cleanup.

use std::path::PathBuf;

use siteforge_aws::AwsCli;
use siteforge_aws::s3::{ObjectPut, S3};
use tracing::{debug, error};

use crate::error::DeployError;
use crate::types::{UploadResult, UploadTask};

/// Uploads one task, returning its result rather than an error so the
/// scheduler can aggregate failures across a batch.
pub async fn upload_one(cli: &dyn AwsCli, bucket: &str, task: &UploadTask) -> UploadResult {
    match try_upload(cli, bucket, task).await {
        Ok(()) => {
            debug!(key = %task.remote_key, gzipped = task.compress, "uploaded");
            UploadResult::ok(task.remote_key.clone(), task.compress)
        }
        Err(e) => {
            error!(key = %task.remote_key, error = %e, "upload failed");
            UploadResult::failed(task.remote_key.clone(), task.compress, e.to_string())
        }
    }
}

async fn try_upload(cli: &dyn AwsCli, bucket: &str, task: &UploadTask) -> Result<(), DeployError> {
    let s3 = S3::new(cli);

    if task.compress {
        // Compression is blocking file I/O; keep it off the runtime
        // threads. The guard deletes the .gz file when this scope
        // ends, upload success or not.
        let input: PathBuf = task.local_path.clone();
        let compressed = tokio::task::spawn_blocking(move || siteforge_compress::gzip_file(&input))
            .await
            .map_err(|e| DeployError::Join(e.to_string()))??;

        let put = ObjectPut {
            bucket,
            key: &task.remote_key,
            body: compressed.path(),
            content_type: &task.content_type,
            content_encoding: Some("gzip"),
            cache_control: &task.cache_control,
        };
        s3.put_object(&put).await?;
    } else {
        let put = ObjectPut {
            bucket,
            key: &task.remote_key,
            body: &task.local_path,
            content_type: &task.content_type,
            content_encoding: None,
            cache_control: &task.cache_control,
        };
        s3.put_object(&put).await?;
    }

    Ok(())
}

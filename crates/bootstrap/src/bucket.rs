//! Bucket provisioning: create and configure for website hosting.

use siteforge_aws::AwsCli;
use siteforge_aws::s3::S3;
use tracing::info;

use crate::error::BootstrapError;

/// Ensures the site bucket exists and is fully configured.
///
/// An existing bucket short-circuits: its configuration is assumed to
/// be the one this tool applied, so re-running bootstrap never touches
/// a live bucket's policy.
pub async fn ensure_bucket(
    cli: &dyn AwsCli,
    bucket: &str,
    region: &str,
) -> Result<(), BootstrapError> {
    let s3 = S3::new(cli);

    if s3.head_bucket(bucket).await? {
        info!(bucket = %bucket, "bucket exists, skipping setup");
        return Ok(());
    }

    info!(bucket = %bucket, region = %region, "creating bucket");
    s3.create_bucket(bucket, region).await?;
    s3.delete_public_access_block(bucket).await?;
    s3.enable_versioning(bucket).await?;
    s3.configure_website(bucket).await?;
    s3.put_public_read_policy(bucket).await?;
    info!(bucket = %bucket, "bucket configured for website hosting");

    Ok(())
}

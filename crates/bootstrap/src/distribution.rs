//! CloudFront distribution creation for the site.

use siteforge_aws::cloudfront::{CloudFront, Distribution, DistributionParams};
use siteforge_aws::s3::S3;
use siteforge_aws::{AwsCli, caller_reference};
use tracing::info;

use crate::error::BootstrapError;

/// Creates the distribution fronting the bucket website endpoint.
pub async fn create_distribution(
    cli: &dyn AwsCli,
    bucket: &str,
    region: &str,
    domains: &[String],
    certificate_arn: &str,
) -> Result<Distribution, BootstrapError> {
    let origin = S3::website_endpoint(bucket, region);
    let params = DistributionParams {
        origin_domain: &origin,
        aliases: domains,
        certificate_arn,
        comment: format!("siteforge: {}", domains[0]),
        caller_reference: caller_reference("siteforge-dist"),
    };

    let distribution = CloudFront::new(cli).create_distribution(&params).await?;
    info!(
        id = %distribution.id,
        domain = %distribution.domain_name,
        "distribution created (global rollout takes 10-20 minutes)"
    );
    Ok(distribution)
}

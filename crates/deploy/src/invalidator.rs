//! CDN cache invalidation after a successful upload.
//!
//! Invalidation is an optimization, never a deployment requirement:
//! a missing distribution id or a failed request is surfaced as a
//! warning by the orchestrator, not an error.

use siteforge_aws::cloudfront::CloudFront;
use siteforge_aws::{AwsCli, caller_reference};
use siteforge_config::CloudFrontSettings;
use tracing::info;

use crate::error::DeployError;

/// Baseline path set: HTML entry points and unversioned metadata.
/// Hashed assets never need invalidation — their names change.
pub const BASE_PATHS: [&str; 5] = ["/", "/index.html", "/*/", "/robots.txt", "/sitemap.xml"];

/// Why an invalidation was not submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationOutcome {
    /// Submitted; carries the invalidation id.
    Submitted(String),
    /// No distribution id in configuration (bootstrap not run yet).
    SkippedNoDistribution,
    /// Operator disabled auto-invalidation.
    SkippedDisabled,
}

/// The baseline paths unioned with operator-supplied custom paths,
/// deduplicated, order-stable.
pub fn invalidation_paths(custom: &[String]) -> Vec<String> {
    let mut paths: Vec<String> = BASE_PATHS.iter().map(|p| (*p).to_string()).collect();
    for path in custom {
        if !paths.contains(path) {
            paths.push(path.clone());
        }
    }
    paths
}

/// Submits one invalidation for the configured distribution.
pub async fn invalidate(
    cli: &dyn AwsCli,
    settings: Option<&CloudFrontSettings>,
) -> Result<InvalidationOutcome, DeployError> {
    let Some(settings) = settings else {
        return Ok(InvalidationOutcome::SkippedNoDistribution);
    };
    let Some(distribution_id) = settings.distribution_id.as_deref() else {
        return Ok(InvalidationOutcome::SkippedNoDistribution);
    };
    if !settings.auto_invalidate {
        return Ok(InvalidationOutcome::SkippedDisabled);
    }

    let paths = invalidation_paths(&settings.invalidate_paths);
    let reference = caller_reference("siteforge-deploy");
    let id = CloudFront::new(cli)
        .create_invalidation(distribution_id, &paths, &reference)
        .await?;

    info!(invalidation = %id, paths = paths.len(), "cache invalidation submitted");
    Ok(InvalidationOutcome::Submitted(id))
}

//! CloudFront operations: distribution creation and cache invalidation.

use serde::Deserialize;

use crate::{AwsCli, AwsError};

/// Inputs for a new distribution.
#[derive(Debug, Clone)]
pub struct DistributionParams<'a> {
    /// Origin: the bucket *website* endpoint, so S3's index/error
    /// documents apply (the raw object endpoint would bypass them).
    pub origin_domain: &'a str,
    pub aliases: &'a [String],
    pub certificate_arn: &'a str,
    pub comment: String,
    pub caller_reference: String,
}

/// A created distribution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Distribution {
    pub id: String,
    pub domain_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateDistributionOutput {
    distribution: Distribution,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateInvalidationOutput {
    invalidation: Invalidation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Invalidation {
    id: String,
}

/// Typed wrapper over `aws cloudfront`.
pub struct CloudFront<'a> {
    cli: &'a dyn AwsCli,
}

impl<'a> CloudFront<'a> {
    pub fn new(cli: &'a dyn AwsCli) -> Self {
        Self { cli }
    }

    /// Creates a distribution for a static site.
    ///
    /// Cache behaviors: 1-day default, 1-hour for `*.html`, 1-year for
    /// `/assets/*`. 404s map back to `/index.html` with a 200 so
    /// client-side routes resolve, with a short negative-cache TTL.
    pub async fn create_distribution(
        &self,
        params: &DistributionParams<'_>,
    ) -> Result<Distribution, AwsError> {
        let config = distribution_config(params);
        let args = vec![
            "cloudfront".into(),
            "create-distribution".into(),
            "--distribution-config".into(),
            config.to_string(),
            "--output".into(),
            "json".into(),
        ];
        let out = self.cli.run(args).await?;
        let parsed: CreateDistributionOutput = serde_json::from_slice(&out)?;
        Ok(parsed.distribution)
    }

    /// Submits one invalidation covering `paths`; returns its id.
    pub async fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: &[String],
        caller_reference: &str,
    ) -> Result<String, AwsError> {
        let batch = serde_json::json!({
            "Paths": {
                "Quantity": paths.len(),
                "Items": paths,
            },
            "CallerReference": caller_reference,
        });
        let args = vec![
            "cloudfront".into(),
            "create-invalidation".into(),
            "--distribution-id".into(),
            distribution_id.into(),
            "--invalidation-batch".into(),
            batch.to_string(),
            "--output".into(),
            "json".into(),
        ];
        let out = self.cli.run(args).await?;
        let parsed: CreateInvalidationOutput = serde_json::from_slice(&out)?;
        Ok(parsed.invalidation.id)
    }
}

fn cache_behavior(path_pattern: Option<&str>, default_ttl: u64, max_ttl: u64) -> serde_json::Value {
    let mut behavior = serde_json::json!({
        "TargetOriginId": "S3Origin",
        "ViewerProtocolPolicy": "redirect-to-https",
        "TrustedSigners": { "Enabled": false, "Quantity": 0 },
        "ForwardedValues": { "QueryString": false, "Cookies": { "Forward": "none" } },
        "MinTTL": 0,
        "DefaultTTL": default_ttl,
        "MaxTTL": max_ttl,
        "Compress": true,
    });
    if let Some(pattern) = path_pattern {
        behavior["PathPattern"] = serde_json::json!(pattern);
    }
    behavior
}

fn distribution_config(params: &DistributionParams<'_>) -> serde_json::Value {
    serde_json::json!({
        "CallerReference": params.caller_reference,
        "Aliases": {
            "Quantity": params.aliases.len(),
            "Items": params.aliases,
        },
        "DefaultRootObject": "index.html",
        "Comment": params.comment,
        "Enabled": true,
        "Origins": {
            "Quantity": 1,
            "Items": [{
                "Id": "S3Origin",
                "DomainName": params.origin_domain,
                "CustomOriginConfig": {
                    "HTTPPort": 80,
                    "HTTPSPort": 443,
                    "OriginProtocolPolicy": "http-only",
                },
            }],
        },
        "DefaultCacheBehavior": cache_behavior(None, 86400, 31536000),
        "CacheBehaviors": {
            "Quantity": 2,
            "Items": [
                cache_behavior(Some("*.html"), 3600, 86400),
                cache_behavior(Some("/assets/*"), 31536000, 31536000),
            ],
        },
        "CustomErrorResponses": {
            "Quantity": 1,
            "Items": [{
                "ErrorCode": 404,
                "ResponsePagePath": "/index.html",
                "ResponseCode": "200",
                "ErrorCachingMinTTL": 300,
            }],
        },
        "ViewerCertificate": {
            "ACMCertificateArn": params.certificate_arn,
            "SSLSupportMethod": "sni-only",
            "MinimumProtocolVersion": "TLSv1.2_2021",
        },
        "PriceClass": "PriceClass_100",
    })
}

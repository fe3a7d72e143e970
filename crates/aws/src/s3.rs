//! S3 operations: bucket provisioning and per-object puts.

use std::path::Path;

use crate::{AwsCli, AwsError};

/// Parameters for a single object put.
#[derive(Debug, Clone)]
pub struct ObjectPut<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
    pub body: &'a Path,
    pub content_type: &'a str,
    pub content_encoding: Option<&'a str>,
    pub cache_control: &'a str,
}

/// Typed wrapper over `aws s3api`.
pub struct S3<'a> {
    cli: &'a dyn AwsCli,
}

impl<'a> S3<'a> {
    pub fn new(cli: &'a dyn AwsCli) -> Self {
        Self { cli }
    }

    /// Returns whether the bucket exists and is reachable.
    ///
    /// `head-bucket` fails for both missing buckets and access errors;
    /// either way the caller proceeds to creation, which will surface
    /// a real permission problem.
    pub async fn head_bucket(&self, bucket: &str) -> Result<bool, AwsError> {
        let args = str_args(&["s3api", "head-bucket", "--bucket", bucket]);
        match self.cli.run(args).await {
            Ok(_) => Ok(true),
            Err(AwsError::Command { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Creates the bucket in `region`.
    ///
    /// Every region except us-east-1 requires an explicit
    /// LocationConstraint.
    pub async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), AwsError> {
        let mut args = str_args(&["s3api", "create-bucket", "--bucket", bucket, "--region", region]);
        if region != "us-east-1" {
            args.push("--create-bucket-configuration".into());
            args.push(format!("LocationConstraint={region}"));
        }
        self.cli.run(args).await?;
        Ok(())
    }

    /// Removes the account-level public access block from the bucket.
    pub async fn delete_public_access_block(&self, bucket: &str) -> Result<(), AwsError> {
        let args = str_args(&["s3api", "delete-public-access-block", "--bucket", bucket]);
        self.cli.run(args).await?;
        Ok(())
    }

    /// Enables object versioning.
    pub async fn enable_versioning(&self, bucket: &str) -> Result<(), AwsError> {
        let args = str_args(&[
            "s3api",
            "put-bucket-versioning",
            "--bucket",
            bucket,
            "--versioning-configuration",
            "Status=Enabled",
        ]);
        self.cli.run(args).await?;
        Ok(())
    }

    /// Configures static website hosting.
    ///
    /// The error document resolves to the same index so client-side
    /// routed pages fall back to the app shell.
    pub async fn configure_website(&self, bucket: &str) -> Result<(), AwsError> {
        let website = serde_json::json!({
            "IndexDocument": { "Suffix": "index.html" },
            "ErrorDocument": { "Key": "index.html" },
        });
        let mut args = str_args(&["s3api", "put-bucket-website", "--bucket", bucket]);
        args.push("--website-configuration".into());
        args.push(website.to_string());
        self.cli.run(args).await?;
        Ok(())
    }

    /// Attaches a public-read policy scoped to all objects.
    pub async fn put_public_read_policy(&self, bucket: &str) -> Result<(), AwsError> {
        let policy = serde_json::json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Sid": "PublicReadGetObject",
                "Effect": "Allow",
                "Principal": "*",
                "Action": "s3:GetObject",
                "Resource": format!("arn:aws:s3:::{bucket}/*"),
            }],
        });
        let mut args = str_args(&["s3api", "put-bucket-policy", "--bucket", bucket]);
        args.push("--policy".into());
        args.push(policy.to_string());
        self.cli.run(args).await?;
        Ok(())
    }

    /// Atomically puts one local file to a remote key with headers.
    pub async fn put_object(&self, put: &ObjectPut<'_>) -> Result<(), AwsError> {
        let mut args = str_args(&[
            "s3api",
            "put-object",
            "--bucket",
            put.bucket,
            "--key",
            put.key,
            "--body",
        ]);
        args.push(put.body.to_string_lossy().into_owned());
        args.push("--content-type".into());
        args.push(put.content_type.into());
        if let Some(encoding) = put.content_encoding {
            args.push("--content-encoding".into());
            args.push(encoding.into());
        }
        args.push("--cache-control".into());
        args.push(put.cache_control.into());

        self.cli.run(args).await?;
        Ok(())
    }

    /// Website endpoint for a bucket, used as the CDN origin.
    pub fn website_endpoint(bucket: &str, region: &str) -> String {
        format!("{bucket}.s3-website-{region}.amazonaws.com")
    }
}

fn str_args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

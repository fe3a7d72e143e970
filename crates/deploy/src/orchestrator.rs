//! Top-level deployment driver.
//!
//! Validates preconditions, drives the batch scheduler, then the
//! invalidator. Only this layer decides what is fatal: upload
//! failures abort the run, invalidation problems do not.

use std::path::Path;
use std::sync::Arc;

use siteforge_aws::AwsCli;
use siteforge_aws::s3::S3;
use siteforge_aws::sts::Sts;
use siteforge_config::SiteConfig;
use tracing::{info, warn};

use crate::error::DeployError;
use crate::invalidator::{InvalidationOutcome, invalidate};
use crate::scanner::scan_site_files;
use crate::scheduler::upload_all;
use crate::types::{DeployOutcome, UploadTask};

/// Orchestrates one full deployment of a build output tree.
pub struct Deployer {
    cli: Arc<dyn AwsCli>,
    config: SiteConfig,
}

impl Deployer {
    pub fn new(cli: Arc<dyn AwsCli>, config: SiteConfig) -> Self {
        Self { cli, config }
    }

    /// Runs the deployment pipeline against `build_root`.
    ///
    /// Precondition failures (invalid config, missing or empty build
    /// output, bad credentials) abort before any cloud mutation.
    pub async fn run(&self, build_root: &Path) -> Result<DeployOutcome, DeployError> {
        self.config.validate()?;
        check_build_root(build_root)?;

        let identity = Sts::new(self.cli.as_ref())
            .caller_identity()
            .await
            .map_err(|e| DeployError::Credentials(e.to_string()))?;
        info!(account = %identity.account, "credentials valid");

        let deploy = &self.config.deploy;
        let options = deploy.options.clone().unwrap_or_default();
        if options.delete_removed {
            warn!("delete_removed is not supported; stale remote objects are left in place");
        }

        let files = scan_site_files(build_root, &options.exclude)?;
        let tasks: Vec<UploadTask> = files
            .into_iter()
            .map(|f| UploadTask::build(f.local_path, f.remote_key, &options.cache_control))
            .collect();

        let summary = upload_all(Arc::clone(&self.cli), &deploy.bucket_name, tasks).await?;

        let invalidation_id = match invalidate(self.cli.as_ref(), deploy.cloudfront.as_ref()).await
        {
            Ok(InvalidationOutcome::Submitted(id)) => Some(id),
            Ok(InvalidationOutcome::SkippedNoDistribution) => {
                warn!("no distribution id configured, skipping invalidation (run `siteforge setup` first)");
                None
            }
            Ok(InvalidationOutcome::SkippedDisabled) => {
                info!("auto-invalidation disabled in configuration");
                None
            }
            Err(e) => {
                // The site is already deployed; stale cache entries
                // expire on their own TTLs.
                warn!(error = %e, "cache invalidation failed");
                None
            }
        };

        let live_url = self.live_url();
        info!(
            uploaded = summary.succeeded,
            gzipped = summary.gzipped,
            url = %live_url,
            "deployment complete"
        );

        Ok(DeployOutcome {
            summary,
            invalidation_id,
            live_url,
        })
    }

    fn live_url(&self) -> String {
        let deploy = &self.config.deploy;
        let has_distribution = deploy
            .cloudfront
            .as_ref()
            .is_some_and(|cf| cf.distribution_id.is_some());
        if has_distribution {
            format!("https://{}", deploy.domain)
        } else {
            format!(
                "http://{}",
                S3::website_endpoint(&deploy.bucket_name, &deploy.region)
            )
        }
    }
}

fn check_build_root(root: &Path) -> Result<(), DeployError> {
    if !root.is_dir() {
        return Err(DeployError::MissingBuildRoot(root.to_path_buf()));
    }
    let mut entries = std::fs::read_dir(root)?;
    if entries.next().is_none() {
        return Err(DeployError::EmptyBuildRoot(root.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use siteforge_aws::AwsError;
    use siteforge_config::{CloudFrontSettings, DeployConfig};
    use tempfile::TempDir;

    /// Mock that answers per AWS service and records put-objects.
    struct SwitchCli {
        calls: Mutex<Vec<Vec<String>>>,
        fail_sts: bool,
    }

    impl SwitchCli {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_sts: false,
            }
        }

        fn with_bad_credentials() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_sts: true,
            }
        }

        fn puts(&self) -> Vec<Vec<String>> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|args| args.get(1).map(String::as_str) == Some("put-object"))
                .cloned()
                .collect()
        }

        fn flag_value(args: &[String], flag: &str) -> Option<String> {
            args.iter()
                .position(|a| a == flag)
                .map(|pos| args[pos + 1].clone())
        }
    }

    impl AwsCli for SwitchCli {
        fn run(
            &self,
            args: Vec<String>,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, AwsError>> + Send + '_>> {
            self.calls.lock().unwrap().push(args.clone());
            let service = args[0].clone();
            let fail_sts = self.fail_sts;
            Box::pin(async move {
                match service.as_str() {
                    "sts" if fail_sts => Err(AwsError::Command {
                        command: "sts get-caller-identity".into(),
                        status: 255,
                        stderr: "InvalidClientTokenId".into(),
                    }),
                    "sts" => Ok(br#"{"Account":"123456789012","Arn":"arn:aws:iam::123456789012:user/me"}"#.to_vec()),
                    "cloudfront" => Ok(br#"{"Invalidation":{"Id":"I42"}}"#.to_vec()),
                    _ => Ok(b"{}".to_vec()),
                }
            })
        }
    }

    fn test_config(distribution: Option<&str>) -> SiteConfig {
        SiteConfig {
            deploy: DeployConfig {
                bucket_name: "my-site".into(),
                region: "eu-west-1".into(),
                domain: "example.com".into(),
                aws: None,
                cloudfront: distribution.map(|id| CloudFrontSettings {
                    distribution_id: Some(id.into()),
                    auto_invalidate: true,
                    invalidate_paths: Vec::new(),
                }),
                options: None,
            },
        }
    }

    fn build_site(dir: &TempDir) {
        let root = dir.path();
        std::fs::write(root.join("index.html"), "<html>home</html>").unwrap();
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("assets").join("app-3f2a1.js"), "console.log(1)").unwrap();
        std::fs::create_dir_all(root.join("about")).unwrap();
        std::fs::write(root.join("about").join("index.html"), "<html>about</html>").unwrap();
    }

    #[tokio::test]
    async fn end_to_end_three_file_site() {
        let dir = TempDir::new().unwrap();
        build_site(&dir);

        let cli = Arc::new(SwitchCli::new());
        let deployer = Deployer::new(cli.clone(), test_config(Some("E123")));
        let outcome = deployer.run(dir.path()).await.unwrap();

        assert_eq!(outcome.summary.succeeded, 3);
        assert_eq!(outcome.summary.gzipped, 3);
        assert_eq!(outcome.invalidation_id.as_deref(), Some("I42"));
        assert_eq!(outcome.live_url, "https://example.com");

        let puts = cli.puts();
        assert_eq!(puts.len(), 3);

        let by_key = |key: &str| {
            puts.iter()
                .find(|args| SwitchCli::flag_value(args, "--key").as_deref() == Some(key))
                .unwrap_or_else(|| panic!("no put for {key}"))
                .clone()
        };

        let index = by_key("index.html");
        assert_eq!(SwitchCli::flag_value(&index, "--content-type").as_deref(), Some("text/html"));
        assert_eq!(SwitchCli::flag_value(&index, "--content-encoding").as_deref(), Some("gzip"));
        assert_eq!(
            SwitchCli::flag_value(&index, "--cache-control").as_deref(),
            Some("public, max-age=3600")
        );

        let asset = by_key("assets/app-3f2a1.js");
        assert_eq!(
            SwitchCli::flag_value(&asset, "--content-type").as_deref(),
            Some("application/javascript")
        );
        assert_eq!(SwitchCli::flag_value(&asset, "--content-encoding").as_deref(), Some("gzip"));
        assert_eq!(
            SwitchCli::flag_value(&asset, "--cache-control").as_deref(),
            Some("public, max-age=31536000, immutable")
        );

        let about = by_key("about/index.html");
        assert_eq!(SwitchCli::flag_value(&about, "--content-type").as_deref(), Some("text/html"));
        assert_eq!(
            SwitchCli::flag_value(&about, "--cache-control").as_deref(),
            Some("public, max-age=3600")
        );
    }

    #[tokio::test]
    async fn missing_build_root_is_fatal_before_any_call() {
        let cli = Arc::new(SwitchCli::new());
        let deployer = Deployer::new(cli.clone(), test_config(None));
        let result = deployer.run(Path::new("/nonexistent/dist")).await;

        assert!(matches!(result, Err(DeployError::MissingBuildRoot(_))));
        assert!(cli.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_build_root_is_fatal_before_any_call() {
        let dir = TempDir::new().unwrap();
        let cli = Arc::new(SwitchCli::new());
        let deployer = Deployer::new(cli.clone(), test_config(None));
        let result = deployer.run(dir.path()).await;

        assert!(matches!(result, Err(DeployError::EmptyBuildRoot(_))));
        assert!(cli.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_config_is_fatal_before_any_call() {
        let dir = TempDir::new().unwrap();
        build_site(&dir);

        let mut config = test_config(None);
        config.deploy.bucket_name = "your-website-bucket-name".into();

        let cli = Arc::new(SwitchCli::new());
        let deployer = Deployer::new(cli.clone(), config);
        let result = deployer.run(dir.path()).await;

        assert!(matches!(result, Err(DeployError::Config(_))));
        assert!(cli.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_credentials_abort_before_uploads() {
        let dir = TempDir::new().unwrap();
        build_site(&dir);

        let cli = Arc::new(SwitchCli::with_bad_credentials());
        let deployer = Deployer::new(cli.clone(), test_config(None));
        let result = deployer.run(dir.path()).await;

        assert!(matches!(result, Err(DeployError::Credentials(_))));
        assert!(cli.puts().is_empty());
    }

    #[tokio::test]
    async fn no_distribution_skips_invalidation_without_failing() {
        let dir = TempDir::new().unwrap();
        build_site(&dir);

        let cli = Arc::new(SwitchCli::new());
        let deployer = Deployer::new(cli.clone(), test_config(None));
        let outcome = deployer.run(dir.path()).await.unwrap();

        assert!(outcome.invalidation_id.is_none());
        assert!(outcome.live_url.starts_with("http://my-site.s3-website-eu-west-1"));
        // No cloudfront calls at all.
        assert!(
            !cli.calls
                .lock()
                .unwrap()
                .iter()
                .any(|args| args[0] == "cloudfront")
        );
    }
}

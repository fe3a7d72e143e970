//! One-time AWS infrastructure bootstrap.
//!
//! Brings a site from a bare config to a fully provisioned stack:
//! hosted zone, website bucket, validated certificate, CloudFront
//! distribution and DNS aliases. Every step is idempotent, so a run
//! interrupted at any point can simply be re-run.

pub mod bucket;
pub mod certificate;
pub mod distribution;
pub mod dns;
pub mod domain;
pub mod error;
pub mod poll;
pub mod zone;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use siteforge_aws::AwsCli;
use siteforge_aws::sts::Sts;
use siteforge_config::SiteConfig;
use tracing::info;

pub use error::BootstrapError;

use crate::certificate::{
    ISSUANCE_ATTEMPTS, ISSUANCE_INTERVAL, VALIDATION_RECORD_ATTEMPTS, VALIDATION_RECORD_INTERVAL,
    ensure_certificate, wait_for_issuance,
};
use crate::domain::cert_domains;

/// Polling cadence, overridable so tests run in milliseconds.
#[derive(Debug, Clone)]
pub struct PollIntervals {
    pub record_interval: Duration,
    pub record_attempts: u32,
    pub issuance_interval: Duration,
    pub issuance_attempts: u32,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            record_interval: VALIDATION_RECORD_INTERVAL,
            record_attempts: VALIDATION_RECORD_ATTEMPTS,
            issuance_interval: ISSUANCE_INTERVAL,
            issuance_attempts: ISSUANCE_ATTEMPTS,
        }
    }
}

/// What a bootstrap run ended up with.
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    pub distribution_id: String,
    pub distribution_domain: String,
    pub certificate_arn: Option<String>,
    /// Present only when the hosted zone was created in this run; the
    /// operator must delegate to these at their registrar.
    pub nameservers: Option<Vec<String>>,
    pub live_url: String,
}

/// Drives the provisioning sequence against a loaded config.
pub struct Bootstrap {
    cli: Arc<dyn AwsCli>,
    config: SiteConfig,
    config_path: PathBuf,
    intervals: PollIntervals,
}

impl Bootstrap {
    pub fn new(cli: Arc<dyn AwsCli>, config: SiteConfig, config_path: PathBuf) -> Self {
        Self {
            cli,
            config,
            config_path,
            intervals: PollIntervals::default(),
        }
    }

    pub fn with_intervals(mut self, intervals: PollIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    /// Runs the full sequence. Re-running after a partial failure is
    /// safe: each step detects existing resources and skips itself.
    pub async fn run(&self) -> Result<BootstrapOutcome, BootstrapError> {
        self.config.validate()?;
        let deploy = &self.config.deploy;

        let identity = Sts::new(self.cli.as_ref()).caller_identity().await?;
        info!(account = %identity.account, arn = %identity.arn, "credentials valid");

        // A recorded distribution means a previous run completed
        // through creation; only the id is reported back.
        if let Some(id) = deploy
            .cloudfront
            .as_ref()
            .and_then(|cf| cf.distribution_id.clone())
        {
            info!(distribution = %id, "distribution already provisioned, nothing to do");
            return Ok(BootstrapOutcome {
                distribution_id: id,
                distribution_domain: String::new(),
                certificate_arn: None,
                nameservers: None,
                live_url: format!("https://{}", deploy.domain),
            });
        }

        let zone = zone::ensure_hosted_zone(self.cli.as_ref(), &deploy.domain).await?;
        let zone_id = zone.zone.short_id().to_string();

        bucket::ensure_bucket(self.cli.as_ref(), &deploy.bucket_name, &deploy.region).await?;

        let domains = cert_domains(&deploy.domain);
        let cert = ensure_certificate(
            self.cli.as_ref(),
            &domains,
            self.intervals.record_interval,
            self.intervals.record_attempts,
        )
        .await?;

        if !cert.pending_validation.is_empty() {
            dns::upsert_validation_records(self.cli.as_ref(), &zone_id, &cert.pending_validation)
                .await?;
            wait_for_issuance(
                self.cli.as_ref(),
                &cert.arn,
                self.intervals.issuance_interval,
                self.intervals.issuance_attempts,
            )
            .await?;
        }

        let dist = distribution::create_distribution(
            self.cli.as_ref(),
            &deploy.bucket_name,
            &deploy.region,
            &domains,
            &cert.arn,
        )
        .await?;

        dns::create_alias_records(self.cli.as_ref(), &zone_id, &domains, &dist.domain_name)
            .await?;

        SiteConfig::persist_distribution_id(&self.config_path, &dist.id)?;
        info!(distribution = %dist.id, config = %self.config_path.display(), "distribution id saved");

        Ok(BootstrapOutcome {
            distribution_id: dist.id,
            distribution_domain: dist.domain_name,
            certificate_arn: Some(cert.arn),
            nameservers: zone.created_nameservers,
            live_url: format!("https://{}", deploy.domain),
        })
    }
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

    /// Full happy-path mock: every service answers as a fresh account
    /// with nothing provisioned, and the certificate issues on the
    /// second describe after records appear.
    struct FreshAccountCli {
        calls: Mutex<Vec<Vec<String>>>,
        describe_count: Mutex<u32>,
    }

    impl FreshAccountCli {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                describe_count: Mutex::new(0),
            }
        }

        fn commands(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|args| format!("{} {}", args[0], args[1]))
                .collect()
        }
    }

    impl AwsCli for FreshAccountCli {
        fn run(
            &self,
            args: Vec<String>,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, AwsError>> + Send + '_>> {
            self.calls.lock().unwrap().push(args.clone());
            let describe_n = if args[1] == "describe-certificate" {
                let mut n = self.describe_count.lock().unwrap();
                *n += 1;
                *n
            } else {
                0
            };
            Box::pin(async move {
                let body: Vec<u8> = match (args[0].as_str(), args[1].as_str()) {
                    ("sts", _) => br#"{"Account":"123","Arn":"arn:aws:iam::123:user/me"}"#.to_vec(),
                    ("route53", "list-hosted-zones") => br#"{"HostedZones":[]}"#.to_vec(),
                    ("route53", "create-hosted-zone") => br#"{
                        "HostedZone":{"Id":"/hostedzone/Z1","Name":"example.com."},
                        "DelegationSet":{"NameServers":["ns-1.awsdns.org"]}
                    }"#
                    .to_vec(),
                    ("route53", "change-resource-record-sets") => b"{}".to_vec(),
                    ("s3api", "head-bucket") => {
                        return Err(AwsError::Command {
                            command: "s3api head-bucket".into(),
                            status: 255,
                            stderr: "Not Found".into(),
                        });
                    }
                    ("s3api", _) => b"{}".to_vec(),
                    ("acm", "list-certificates") => br#"{"CertificateSummaryList":[]}"#.to_vec(),
                    ("acm", "request-certificate") => {
                        br#"{"CertificateArn":"arn:cert/new"}"#.to_vec()
                    }
                    ("acm", "describe-certificate") if describe_n == 1 => br#"{"Certificate":{
                        "CertificateArn":"arn:cert/new",
                        "DomainName":"example.com",
                        "SubjectAlternativeNames":["www.example.com"],
                        "Status":"PENDING_VALIDATION",
                        "DomainValidationOptions":[
                            {"DomainName":"example.com",
                             "ResourceRecord":{"Name":"_a.example.com.","Type":"CNAME","Value":"v1"}},
                            {"DomainName":"www.example.com",
                             "ResourceRecord":{"Name":"_b.example.com.","Type":"CNAME","Value":"v2"}}
                        ]
                    }}"#
                    .to_vec(),
                    ("acm", "describe-certificate") => br#"{"Certificate":{
                        "CertificateArn":"arn:cert/new",
                        "DomainName":"example.com",
                        "SubjectAlternativeNames":["www.example.com"],
                        "Status":"ISSUED",
                        "DomainValidationOptions":[]
                    }}"#
                    .to_vec(),
                    ("cloudfront", "create-distribution") => br#"{"Distribution":{
                        "Id":"E999","DomainName":"d999.cloudfront.net"
                    }}"#
                    .to_vec(),
                    (service, command) => panic!("unexpected call {service} {command}"),
                };
                Ok(body)
            })
        }
    }

    fn write_config(dir: &TempDir) -> (SiteConfig, PathBuf) {
        let config = SiteConfig {
            deploy: DeployConfig {
                bucket_name: "my-site".into(),
                region: "eu-west-1".into(),
                domain: "example.com".into(),
                aws: None,
                cloudfront: None,
                options: None,
            },
        };
        let path = dir.path().join("siteforge.toml");
        config.save(&path).unwrap();
        (config, path)
    }

    fn fast_intervals() -> PollIntervals {
        PollIntervals {
            record_interval: Duration::from_millis(1),
            record_attempts: 10,
            issuance_interval: Duration::from_millis(1),
            issuance_attempts: 10,
        }
    }

    #[tokio::test]
    async fn fresh_account_provisions_everything_in_order() {
        let dir = TempDir::new().unwrap();
        let (config, path) = write_config(&dir);

        let cli = Arc::new(FreshAccountCli::new());
        let bootstrap =
            Bootstrap::new(cli.clone(), config, path.clone()).with_intervals(fast_intervals());
        let outcome = bootstrap.run().await.unwrap();

        assert_eq!(outcome.distribution_id, "E999");
        assert_eq!(outcome.distribution_domain, "d999.cloudfront.net");
        assert_eq!(outcome.certificate_arn.as_deref(), Some("arn:cert/new"));
        assert_eq!(outcome.nameservers.as_deref(), Some(&["ns-1.awsdns.org".to_string()][..]));
        assert_eq!(outcome.live_url, "https://example.com");

        let commands = cli.commands();
        let order = [
            "sts get-caller-identity",
            "route53 list-hosted-zones",
            "route53 create-hosted-zone",
            "s3api head-bucket",
            "s3api create-bucket",
            "acm list-certificates",
            "acm request-certificate",
            "route53 change-resource-record-sets",
            "cloudfront create-distribution",
        ];
        let mut last = 0;
        for step in order {
            let pos = commands
                .iter()
                .skip(last)
                .position(|c| c == step)
                .unwrap_or_else(|| panic!("{step} missing or out of order"));
            last += pos + 1;
        }

        // Two validation records and two aliases: four record changes.
        let changes = commands
            .iter()
            .filter(|c| *c == "route53 change-resource-record-sets")
            .count();
        assert_eq!(changes, 4);

        // The new distribution id landed in the config file.
        let saved = SiteConfig::load(&path).unwrap();
        assert_eq!(
            saved.deploy.cloudfront.unwrap().distribution_id.as_deref(),
            Some("E999")
        );
    }

    #[tokio::test]
    async fn existing_distribution_short_circuits() {
        let dir = TempDir::new().unwrap();
        let (mut config, path) = write_config(&dir);
        config.deploy.cloudfront = Some(CloudFrontSettings {
            distribution_id: Some("EOLD".into()),
            auto_invalidate: true,
            invalidate_paths: Vec::new(),
        });

        let cli = Arc::new(FreshAccountCli::new());
        let bootstrap = Bootstrap::new(cli.clone(), config, path).with_intervals(fast_intervals());
        let outcome = bootstrap.run().await.unwrap();

        assert_eq!(outcome.distribution_id, "EOLD");
        // Only the credential check ran.
        assert_eq!(cli.commands(), vec!["sts get-caller-identity"]);
    }
}

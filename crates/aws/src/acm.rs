//! ACM operations: certificate discovery, request and status.
//!
//! CloudFront only accepts certificates from us-east-1, so every ACM
//! call pins that region regardless of the deploy region.

use serde::Deserialize;

use crate::{AwsCli, AwsError};

/// Region ACM certificates must live in for CloudFront.
pub const ACM_REGION: &str = "us-east-1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListCertificatesOutput {
    #[serde(default)]
    certificate_summary_list: Vec<CertificateSummary>,
}

/// Summary entry from list-certificates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateSummary {
    pub certificate_arn: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeCertificateOutput {
    certificate: CertificateDetail,
}

/// Full certificate detail from describe-certificate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateDetail {
    pub certificate_arn: String,
    pub domain_name: String,
    #[serde(default)]
    pub subject_alternative_names: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub domain_validation_options: Vec<DomainValidation>,
}

impl CertificateDetail {
    /// Whether this certificate covers every domain in `domains`
    /// (exact membership, not prefix match).
    pub fn covers(&self, domains: &[String]) -> bool {
        domains
            .iter()
            .all(|d| self.domain_name == *d || self.subject_alternative_names.contains(d))
    }

    /// Validation records, but only once every domain option has one.
    ///
    /// A certificate is not ready for DNS-record creation until all of
    /// its validation options expose a resource record.
    pub fn validation_records(&self) -> Option<Vec<ValidationRecord>> {
        if self.domain_validation_options.is_empty() {
            return None;
        }
        self.domain_validation_options
            .iter()
            .map(|opt| opt.resource_record.clone())
            .collect()
    }
}

/// Per-domain validation state on a certificate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainValidation {
    pub domain_name: String,
    #[serde(default)]
    pub resource_record: Option<ValidationRecord>,
}

/// The DNS record ACM wants to see for one domain.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationRecord {
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RequestCertificateOutput {
    certificate_arn: String,
}

/// Typed wrapper over `aws acm`.
pub struct Acm<'a> {
    cli: &'a dyn AwsCli,
}

impl<'a> Acm<'a> {
    pub fn new(cli: &'a dyn AwsCli) -> Self {
        Self { cli }
    }

    /// Lists certificate summaries in the issuance region.
    pub async fn list_certificates(&self) -> Result<Vec<CertificateSummary>, AwsError> {
        let args = region_args(&["acm", "list-certificates"]);
        let out = self.cli.run(args).await?;
        let parsed: ListCertificatesOutput = serde_json::from_slice(&out)?;
        Ok(parsed.certificate_summary_list)
    }

    /// Describes a certificate by ARN.
    pub async fn describe_certificate(&self, arn: &str) -> Result<CertificateDetail, AwsError> {
        let mut args = region_args(&["acm", "describe-certificate"]);
        args.push("--certificate-arn".into());
        args.push(arn.into());
        let out = self.cli.run(args).await?;
        let parsed: DescribeCertificateOutput = serde_json::from_slice(&out)?;
        Ok(parsed.certificate)
    }

    /// Requests a DNS-validated certificate; returns the new ARN.
    pub async fn request_certificate(&self, domains: &[String]) -> Result<String, AwsError> {
        let primary = domains
            .first()
            .ok_or_else(|| AwsError::Malformed("empty certificate domain set".into()))?;

        let mut args = region_args(&["acm", "request-certificate"]);
        args.push("--domain-name".into());
        args.push(primary.clone());
        if domains.len() > 1 {
            args.push("--subject-alternative-names".into());
            args.extend(domains[1..].iter().cloned());
        }
        args.push("--validation-method".into());
        args.push("DNS".into());

        let out = self.cli.run(args).await?;
        let parsed: RequestCertificateOutput = serde_json::from_slice(&out)?;
        Ok(parsed.certificate_arn)
    }
}

fn region_args(parts: &[&str]) -> Vec<String> {
    let mut args: Vec<String> = parts.iter().map(|s| (*s).to_string()).collect();
    args.push("--region".into());
    args.push(ACM_REGION.into());
    args.push("--output".into());
    args.push("json".into());
    args
}

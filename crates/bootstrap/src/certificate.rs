//! Certificate acquisition: reuse an issued certificate or request one.

use std::time::Duration;

use siteforge_aws::acm::{Acm, ValidationRecord};
use siteforge_aws::{AwsCli, AwsError};
use tracing::{info, warn};

use crate::error::BootstrapError;
use crate::poll::{Probe, poll_until};

/// How often a freshly requested certificate is probed for validation
/// records. ACM usually attaches them within seconds.
pub const VALIDATION_RECORD_INTERVAL: Duration = Duration::from_secs(2);
pub const VALIDATION_RECORD_ATTEMPTS: u32 = 30;

/// How often a pending certificate is probed for issuance. DNS
/// propagation plus ACM validation routinely takes minutes.
pub const ISSUANCE_INTERVAL: Duration = Duration::from_secs(10);
pub const ISSUANCE_ATTEMPTS: u32 = 60;

/// A certificate bootstrap settled on.
pub struct CertificateOutcome {
    pub arn: String,
    /// Validation records that still need DNS entries. Empty when an
    /// already-issued certificate was reused.
    pub pending_validation: Vec<ValidationRecord>,
}

/// Finds an issued certificate covering `domains`, or requests a new
/// DNS-validated one and waits until its validation records appear.
pub async fn ensure_certificate(
    cli: &dyn AwsCli,
    domains: &[String],
    record_interval: Duration,
    record_attempts: u32,
) -> Result<CertificateOutcome, BootstrapError> {
    let acm = Acm::new(cli);

    for summary in acm.list_certificates().await? {
        if summary.status.as_deref() != Some("ISSUED") {
            continue;
        }
        let detail = acm.describe_certificate(&summary.certificate_arn).await?;
        if detail.status == "ISSUED" && detail.covers(domains) {
            info!(arn = %detail.certificate_arn, "reusing issued certificate");
            return Ok(CertificateOutcome {
                arn: detail.certificate_arn,
                pending_validation: Vec::new(),
            });
        }
    }

    let arn = acm.request_certificate(domains).await?;
    info!(arn = %arn, domains = ?domains, "certificate requested");

    // ACM attaches validation records asynchronously after the
    // request; the describe output is incomplete until then.
    let records = poll_until(
        "certificate validation records",
        record_interval,
        record_attempts,
        || async {
            match acm.describe_certificate(&arn).await {
                Ok(detail) => match detail.validation_records() {
                    Some(records) => Probe::Ready(records),
                    None => Probe::Pending,
                },
                // A failed describe is usually throttling or eventual
                // consistency; the attempt budget bounds the retries.
                Err(AwsError::Command { stderr, .. }) => {
                    warn!(error = %stderr, "describe-certificate failed, retrying");
                    Probe::Pending
                }
                Err(e) => Probe::Failed(e.into()),
            }
        },
    )
    .await?;

    Ok(CertificateOutcome {
        arn,
        pending_validation: records,
    })
}

/// Waits until `arn` reaches ISSUED.
///
/// Any other terminal status (FAILED, VALIDATION_TIMED_OUT, REVOKED)
/// aborts immediately instead of burning the polling budget.
pub async fn wait_for_issuance(
    cli: &dyn AwsCli,
    arn: &str,
    interval: Duration,
    max_attempts: u32,
) -> Result<(), BootstrapError> {
    let acm = Acm::new(cli);

    poll_until("certificate issuance", interval, max_attempts, || async {
        match acm.describe_certificate(arn).await {
            Ok(detail) => match detail.status.as_str() {
                "ISSUED" => Probe::Ready(()),
                "PENDING_VALIDATION" => Probe::Pending,
                status => Probe::Failed(BootstrapError::CertificateFailed {
                    arn: arn.to_string(),
                    status: status.to_string(),
                }),
            },
            Err(AwsError::Command { stderr, .. }) => {
                warn!(error = %stderr, "describe-certificate failed, retrying");
                Probe::Pending
            }
            Err(e) => Probe::Failed(e.into()),
        }
    })
    .await?;

    info!(arn = %arn, "certificate issued");
    Ok(())
}

//! DNS record creation: certificate validation CNAMEs and site aliases.

use siteforge_aws::AwsCli;
use siteforge_aws::acm::ValidationRecord;
use siteforge_aws::route53::Route53;
use tracing::{info, warn};

use crate::error::BootstrapError;

const VALIDATION_TTL: u32 = 300;

/// Upserts the certificate validation CNAMEs into `zone_id`.
///
/// If an upsert is rejected, the existing record is read back: an
/// identical value means a previous run already wrote it and the
/// failure is ignored; a different value is fatal because ACM will
/// never validate against it.
pub async fn upsert_validation_records(
    cli: &dyn AwsCli,
    zone_id: &str,
    records: &[ValidationRecord],
) -> Result<(), BootstrapError> {
    let route53 = Route53::new(cli);

    for record in records {
        match route53
            .upsert_record(zone_id, &record.name, &record.record_type, VALIDATION_TTL, &record.value)
            .await
        {
            Ok(()) => {
                info!(record = %record.name, "validation record in place");
            }
            Err(e) => {
                let found = route53
                    .record_value(zone_id, &record.name, &record.record_type)
                    .await?;
                match found {
                    Some(existing) if existing == record.value => {
                        info!(record = %record.name, "validation record already correct");
                    }
                    Some(existing) => {
                        return Err(BootstrapError::ValidationRecordMismatch {
                            name: record.name.clone(),
                            expected: record.value.clone(),
                            found: existing,
                        });
                    }
                    None => return Err(e.into()),
                }
            }
        }
    }
    Ok(())
}

/// Creates A alias records pointing every site domain at the
/// distribution. A record that already exists is left alone.
pub async fn create_alias_records(
    cli: &dyn AwsCli,
    zone_id: &str,
    domains: &[String],
    distribution_domain: &str,
) -> Result<(), BootstrapError> {
    let route53 = Route53::new(cli);

    for domain in domains {
        match route53.create_alias(zone_id, domain, distribution_domain).await {
            Ok(()) => {
                info!(domain = %domain, target = %distribution_domain, "alias record created");
            }
            Err(siteforge_aws::AwsError::Command { stderr, .. })
                if stderr.contains("already exists") =>
            {
                warn!(domain = %domain, "alias record already exists, leaving it");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

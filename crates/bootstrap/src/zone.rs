//! Hosted zone resolution: find or create at the registrable root.

use siteforge_aws::route53::{HostedZone, Route53};
use siteforge_aws::{AwsCli, caller_reference};
use tracing::{info, warn};

use crate::domain::root_domain;
use crate::error::BootstrapError;

/// A zone that bootstrap resolved, with how it was resolved.
pub struct ZoneOutcome {
    pub zone: HostedZone,
    /// Nameservers of a zone created in this run. Existing zones carry
    /// none; their delegation is assumed to already be in place.
    pub created_nameservers: Option<Vec<String>>,
}

/// Finds the hosted zone for the root of `domain`, creating it if absent.
pub async fn ensure_hosted_zone(
    cli: &dyn AwsCli,
    domain: &str,
) -> Result<ZoneOutcome, BootstrapError> {
    let root = root_domain(domain);
    let route53 = Route53::new(cli);

    if let Some(zone) = route53.find_hosted_zone(&root).await? {
        info!(zone = %zone.short_id(), domain = %root, "hosted zone exists");
        return Ok(ZoneOutcome {
            zone,
            created_nameservers: None,
        });
    }

    let reference = caller_reference("siteforge-zone");
    let (zone, nameservers) = route53.create_hosted_zone(&root, &reference).await?;
    info!(zone = %zone.short_id(), domain = %root, "hosted zone created");
    warn!(
        nameservers = ?nameservers,
        "update your registrar's NS records to these nameservers or DNS will not resolve"
    );

    Ok(ZoneOutcome {
        zone,
        created_nameservers: Some(nameservers),
    })
}

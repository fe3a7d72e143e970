//! Route 53 operations: hosted zones and record sets.

use serde::{Deserialize, Serialize};

use crate::{AwsCli, AwsError};

/// CloudFront's fixed hosted-zone id for alias targets.
pub const CLOUDFRONT_ALIAS_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// A Route 53 hosted zone.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZone {
    pub id: String,
    pub name: String,
}

impl HostedZone {
    /// Zone id without the `/hostedzone/` prefix the API returns.
    pub fn short_id(&self) -> &str {
        self.id.trim_start_matches("/hostedzone/")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListHostedZonesOutput {
    #[serde(default)]
    hosted_zones: Vec<HostedZone>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateHostedZoneOutput {
    hosted_zone: HostedZone,
    #[serde(default)]
    delegation_set: Option<DelegationSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetHostedZoneOutput {
    #[serde(default)]
    delegation_set: Option<DelegationSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DelegationSet {
    #[serde(default)]
    name_servers: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListRecordSetsOutput {
    #[serde(default)]
    resource_record_sets: Vec<RecordSet>,
}

/// An existing record set, as returned by list-resource-record-sets.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordSet {
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(default)]
    pub resource_records: Vec<RecordValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordValue {
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ChangeBatch {
    changes: Vec<Change>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Change {
    action: &'static str,
    resource_record_set: ChangeRecordSet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ChangeRecordSet {
    name: String,
    #[serde(rename = "Type")]
    record_type: String,
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_records: Option<Vec<RecordValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias_target: Option<AliasTarget>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AliasTarget {
    #[serde(rename = "DNSName")]
    dns_name: String,
    evaluate_target_health: bool,
    hosted_zone_id: &'static str,
}

/// Typed wrapper over `aws route53`.
pub struct Route53<'a> {
    cli: &'a dyn AwsCli,
}

impl<'a> Route53<'a> {
    pub fn new(cli: &'a dyn AwsCli) -> Self {
        Self { cli }
    }

    /// Finds the hosted zone whose name matches `domain`, if any.
    pub async fn find_hosted_zone(&self, domain: &str) -> Result<Option<HostedZone>, AwsError> {
        let args = vec!["route53".into(), "list-hosted-zones".into(), "--output".into(), "json".into()];
        let out = self.cli.run(args).await?;
        let parsed: ListHostedZonesOutput = serde_json::from_slice(&out)?;

        let wanted = format!("{}.", domain.trim_end_matches('.'));
        Ok(parsed.hosted_zones.into_iter().find(|z| z.name == wanted))
    }

    /// Creates a hosted zone for `domain`.
    pub async fn create_hosted_zone(
        &self,
        domain: &str,
        caller_reference: &str,
    ) -> Result<(HostedZone, Vec<String>), AwsError> {
        let args = vec![
            "route53".into(),
            "create-hosted-zone".into(),
            "--name".into(),
            domain.into(),
            "--caller-reference".into(),
            caller_reference.into(),
            "--output".into(),
            "json".into(),
        ];
        let out = self.cli.run(args).await?;
        let parsed: CreateHostedZoneOutput = serde_json::from_slice(&out)?;

        let nameservers = match parsed.delegation_set {
            Some(set) if !set.name_servers.is_empty() => set.name_servers,
            _ => self.nameservers(parsed.hosted_zone.short_id()).await?,
        };
        Ok((parsed.hosted_zone, nameservers))
    }

    /// Fetches the delegation-set nameservers for a zone.
    pub async fn nameservers(&self, zone_id: &str) -> Result<Vec<String>, AwsError> {
        let args = vec![
            "route53".into(),
            "get-hosted-zone".into(),
            "--id".into(),
            zone_id.into(),
            "--output".into(),
            "json".into(),
        ];
        let out = self.cli.run(args).await?;
        let parsed: GetHostedZoneOutput = serde_json::from_slice(&out)?;
        Ok(parsed.delegation_set.map(|s| s.name_servers).unwrap_or_default())
    }

    /// Creates or updates a plain record (certificate validation CNAMEs).
    pub async fn upsert_record(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
        ttl: u32,
        value: &str,
    ) -> Result<(), AwsError> {
        let record = ChangeRecordSet {
            name: name.into(),
            record_type: record_type.into(),
            ttl: Some(ttl),
            resource_records: Some(vec![RecordValue { value: value.into() }]),
            alias_target: None,
        };
        self.change_record("UPSERT", zone_id, record).await
    }

    /// Creates an A alias record pointing at a CloudFront distribution.
    pub async fn create_alias(
        &self,
        zone_id: &str,
        name: &str,
        target_dns: &str,
    ) -> Result<(), AwsError> {
        let record = ChangeRecordSet {
            name: name.into(),
            record_type: "A".into(),
            ttl: None,
            resource_records: None,
            alias_target: Some(AliasTarget {
                dns_name: target_dns.into(),
                evaluate_target_health: false,
                hosted_zone_id: CLOUDFRONT_ALIAS_ZONE_ID,
            }),
        };
        self.change_record("CREATE", zone_id, record).await
    }

    /// Reads the first value of an existing record, if present.
    pub async fn record_value(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Option<String>, AwsError> {
        let args = vec![
            "route53".into(),
            "list-resource-record-sets".into(),
            "--hosted-zone-id".into(),
            zone_id.into(),
            "--output".into(),
            "json".into(),
        ];
        let out = self.cli.run(args).await?;
        let parsed: ListRecordSetsOutput = serde_json::from_slice(&out)?;

        let wanted = format!("{}.", name.trim_end_matches('.'));
        Ok(parsed
            .resource_record_sets
            .into_iter()
            .find(|r| r.name == wanted && r.record_type == record_type)
            .and_then(|r| r.resource_records.into_iter().next())
            .map(|v| v.value))
    }

    async fn change_record(
        &self,
        action: &'static str,
        zone_id: &str,
        record: ChangeRecordSet,
    ) -> Result<(), AwsError> {
        let batch = ChangeBatch {
            changes: vec![Change {
                action,
                resource_record_set: record,
            }],
        };
        let args = vec![
            "route53".into(),
            "change-resource-record-sets".into(),
            "--hosted-zone-id".into(),
            zone_id.into(),
            "--change-batch".into(),
            serde_json::to_string(&batch)?,
        ];
        self.cli.run(args).await?;
        Ok(())
    }
}

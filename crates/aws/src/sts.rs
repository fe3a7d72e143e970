//! STS credential preflight.

use serde::Deserialize;

use crate::{AwsCli, AwsError};

/// Identity of the configured credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
}

/// Typed wrapper over `aws sts`.
pub struct Sts<'a> {
    cli: &'a dyn AwsCli,
}

impl<'a> Sts<'a> {
    pub fn new(cli: &'a dyn AwsCli) -> Self {
        Self { cli }
    }

    /// Verifies credentials resolve to a real identity.
    ///
    /// Run before any mutating call so credential problems surface as
    /// a precondition failure, not halfway through an upload batch.
    pub async fn caller_identity(&self) -> Result<CallerIdentity, AwsError> {
        let args = vec![
            "sts".into(),
            "get-caller-identity".into(),
            "--output".into(),
            "json".into(),
        ];
        let out = self.cli.run(args).await?;
        Ok(serde_json::from_slice(&out)?)
    }
}

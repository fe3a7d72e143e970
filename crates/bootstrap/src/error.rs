//! Bootstrap error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("AWS error: {0}")]
    Aws(#[from] siteforge_aws::AwsError),

    #[error("configuration error: {0}")]
    Config(#[from] siteforge_config::ConfigError),

    #[error(
        "validation record {name} already exists with a different value \
         (expected {expected}, found {found}); remove the stale record and re-run"
    )]
    ValidationRecordMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("certificate {arn} entered terminal status {status}")]
    CertificateFailed { arn: String, status: String },

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

//! Deploy error types.

use std::path::PathBuf;

use crate::types::UploadSummary;

/// Errors produced during site deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] siteforge_config::ConfigError),

    #[error("AWS error: {0}")]
    Aws(#[from] siteforge_aws::AwsError),

    #[error("compression error: {0}")]
    Compress(#[from] siteforge_compress::CompressError),

    #[error("build output not found at {} (run the build first)", .0.display())]
    MissingBuildRoot(PathBuf),

    #[error("build output at {} is empty (run the build first)", .0.display())]
    EmptyBuildRoot(PathBuf),

    #[error("credential check failed: {0}")]
    Credentials(String),

    #[error("upload batch failed: {0}")]
    UploadsFailed(UploadSummary),

    #[error("task join error: {0}")]
    Join(String),
}

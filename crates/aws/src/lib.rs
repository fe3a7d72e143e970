//! Thin command/request seam over the AWS CLI.
//!
//! All cloud interaction goes through the [`AwsCli`] trait: one call,
//! one `aws` invocation, JSON out. [`CliRunner`] is the real
//! implementation over `tokio::process`; tests substitute mocks.
//! Service modules wrap the raw seam with typed requests/responses.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

pub mod acm;
pub mod cloudfront;
pub mod route53;
pub mod s3;
pub mod sts;

/// Errors produced by AWS CLI invocations.
#[derive(Debug, thiserror::Error)]
pub enum AwsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("aws CLI not found in PATH (install it from https://aws.amazon.com/cli/)")]
    CliNotFound,

    #[error("aws {command} failed with status {status}: {stderr}")]
    Command {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("unexpected aws response: {0}")]
    Malformed(String),
}

/// Abstract AWS CLI invocation.
///
/// One method keeps the seam small: callers pass the full argument
/// vector (service, operation, flags) and get raw stdout back.
/// Using a trait keeps cloud logic decoupled from process spawning
/// and testable with mocks.
pub trait AwsCli: Send + Sync {
    /// Runs `aws <args...>` and returns stdout on success.
    fn run(
        &self,
        args: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, AwsError>> + Send + '_>>;
}

/// Credential and region context for spawned CLI processes.
///
/// Mirrors what the CLI itself reads from the environment: explicit
/// keys win over a named profile, and the region becomes
/// `AWS_DEFAULT_REGION` so data-plane calls need no per-call flag.
/// Calls that pass an explicit `--region` (certificate issuance) still
/// override it.
#[derive(Debug, Clone, Default)]
pub struct CliEnv {
    pub profile: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
}

/// Real AWS CLI runner.
///
/// Spawns `aws` with an argument array (never through a shell),
/// injecting `--profile` and the credential/region environment from
/// [`CliEnv`].
#[derive(Debug, Clone, Default)]
pub struct CliRunner {
    env: CliEnv,
}

impl CliRunner {
    pub fn new(env: CliEnv) -> Self {
        Self { env }
    }

    fn build_command(&self, args: &[String]) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("aws");
        if let Some(profile) = &self.env.profile {
            cmd.arg("--profile").arg(profile);
        }
        if let Some(key) = &self.env.access_key_id {
            cmd.env("AWS_ACCESS_KEY_ID", key);
        }
        if let Some(secret) = &self.env.secret_access_key {
            cmd.env("AWS_SECRET_ACCESS_KEY", secret);
        }
        if let Some(region) = &self.env.region {
            cmd.env("AWS_DEFAULT_REGION", region);
        }
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd
    }
}

impl AwsCli for CliRunner {
    fn run(
        &self,
        args: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, AwsError>> + Send + '_>> {
        Box::pin(async move {
            let mut cmd = self.build_command(&args);

            let command = args.iter().take(2).cloned().collect::<Vec<_>>().join(" ");
            tracing::debug!(command = %command, "running aws CLI");

            let output = cmd.output().await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AwsError::CliNotFound
                } else {
                    AwsError::Io(e)
                }
            })?;

            if !output.status.success() {
                return Err(AwsError::Command {
                    command,
                    status: output.status.code().unwrap_or(-1),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                });
            }

            Ok(output.stdout)
        })
    }
}

/// Builds a unique caller reference for mutating AWS requests.
///
/// Timestamp plus a v4 UUID suffix so repeated invocations within the
/// same millisecond never collide.
pub fn caller_reference(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{millis}-{}", &nonce[..8])
}

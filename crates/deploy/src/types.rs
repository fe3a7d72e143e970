//! Data types for the deploy pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use siteforge_policy::CACHE_IMMUTABLE;

/// One file scheduled for upload. Built once at enumeration time,
/// consumed exactly once by the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub local_path: PathBuf,
    /// Key relative to the build root, `/`-separated.
    pub remote_key: String,
    pub content_type: String,
    pub cache_control: String,
    pub compress: bool,
}

impl UploadTask {
    /// Builds a task by resolving the upload policy for one file.
    ///
    /// `cache_overrides` comes from `deploy.options.cache_control`:
    /// exact MIME type, then `family/*`, then `default`. Hashed assets
    /// keep the immutable directive regardless — overriding those
    /// would defeat content-hash caching.
    pub fn build(
        local_path: PathBuf,
        remote_key: String,
        cache_overrides: &BTreeMap<String, String>,
    ) -> Self {
        let policy = siteforge_policy::resolve(&local_path, &remote_key);
        let cache_control = effective_cache_control(&policy, cache_overrides);
        Self {
            local_path,
            remote_key,
            content_type: policy.content_type.to_string(),
            cache_control,
            compress: policy.compress,
        }
    }
}

fn effective_cache_control(
    policy: &siteforge_policy::FilePolicy,
    overrides: &BTreeMap<String, String>,
) -> String {
    if policy.cache_control == CACHE_IMMUTABLE {
        return CACHE_IMMUTABLE.to_string();
    }
    if let Some(v) = overrides.get(policy.content_type) {
        return v.clone();
    }
    if let Some(family) = policy.content_type.split('/').next()
        && let Some(v) = overrides.get(&format!("{family}/*"))
    {
        return v.clone();
    }
    if let Some(v) = overrides.get("default") {
        return v.clone();
    }
    policy.cache_control.to_string()
}

/// Outcome of one upload task.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub remote_key: String,
    pub success: bool,
    pub gzipped: bool,
    pub error: Option<String>,
}

impl UploadResult {
    pub fn ok(remote_key: String, gzipped: bool) -> Self {
        Self {
            remote_key,
            success: true,
            gzipped,
            error: None,
        }
    }

    pub fn failed(remote_key: String, gzipped: bool, error: String) -> Self {
        Self {
            remote_key,
            success: false,
            gzipped,
            error: Some(error),
        }
    }
}

/// One failed upload inside a batch.
#[derive(Debug, Clone)]
pub struct UploadFailure {
    pub remote_key: String,
    pub error: String,
}

/// Aggregate over all attempted uploads.
#[derive(Debug, Clone, Default)]
pub struct UploadSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub gzipped: usize,
    pub failures: Vec<UploadFailure>,
}

impl UploadSummary {
    pub fn record(&mut self, result: UploadResult) {
        self.attempted += 1;
        if result.success {
            self.succeeded += 1;
            if result.gzipped {
                self.gzipped += 1;
            }
        } else {
            self.failures.push(UploadFailure {
                remote_key: result.remote_key,
                error: result.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} uploads failed",
            self.failures.len(),
            self.attempted
        )
    }
}

/// Outcome of a full deployment run.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub summary: UploadSummary,
    pub invalidation_id: Option<String>,
    pub live_url: String,
}

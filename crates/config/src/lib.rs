//! Deploy configuration management.
//!
//! Configuration lives in `siteforge.toml` in the project root:
//!
//! ```toml
//! [deploy]
//! bucket_name = "my-site-bucket"
//! region = "eu-west-1"
//! domain = "example.com"
//!
//! [deploy.aws]
//! profile = "personal"
//!
//! [deploy.cloudfront]
//! distribution_id = "E123ABC"
//! auto_invalidate = true
//! invalidate_paths = ["/feed.xml"]
//!
//! [deploy.options]
//! exclude = [".DS_Store"]
//! ```
//!
//! The bootstrap flow writes the distribution id back through
//! [`SiteConfig::persist_distribution_id`], a structured
//! read-modify-write of the whole record rather than text patching.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default config file name.
pub const CONFIG_FILE: &str = "siteforge.toml";

/// Placeholder bucket name left by the scaffolder; deploying with it
/// still in place is a validation error.
const PLACEHOLDER_BUCKET: &str = "your-website-bucket-name";

/// Errors produced by configuration handling.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Top-level configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub deploy: DeployConfig,
}

/// The `[deploy]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployConfig {
    pub bucket_name: String,
    pub region: String,
    pub domain: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudfront: Option<CloudFrontSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<DeployOptions>,
}

/// Credential selection: a named profile or explicit keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

/// The `[deploy.cloudfront]` table, populated by bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_id: Option<String>,
    #[serde(default = "default_true")]
    pub auto_invalidate: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalidate_paths: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// The `[deploy.options]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployOptions {
    #[serde(default)]
    pub delete_removed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Content-type → cache-control overrides. Keys are exact MIME
    /// types (`text/html`), family wildcards (`image/*`) or `default`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cache_control: BTreeMap<String, String>,
}

impl SiteConfig {
    /// Loads and parses the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: SiteConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the config back to disk.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Validates the fields required before any network action.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let deploy = &self.deploy;
        if deploy.bucket_name.is_empty() || deploy.bucket_name == PLACEHOLDER_BUCKET {
            return Err(ConfigError::Validation(
                "deploy.bucket_name must be set to a real bucket name".into(),
            ));
        }
        if deploy.region.is_empty() {
            return Err(ConfigError::Validation("deploy.region must be set".into()));
        }
        if deploy.domain.is_empty() {
            return Err(ConfigError::Validation("deploy.domain must be set".into()));
        }
        Ok(())
    }

    /// Records a newly created distribution id into the config file.
    ///
    /// Read-modify-write of the structured record: later runs (and the
    /// invalidator) pick the id up from `deploy.cloudfront`.
    pub fn persist_distribution_id(path: &Path, id: &str) -> Result<(), ConfigError> {
        let mut config = Self::load(path)?;
        let cloudfront = config.deploy.cloudfront.get_or_insert_with(|| CloudFrontSettings {
            distribution_id: None,
            auto_invalidate: true,
            invalidate_paths: Vec::new(),
        });
        cloudfront.distribution_id = Some(id.to_string());
        config.save(path)
    }
}

//! Static site deployment pipeline.
//!
//! Scans a build output tree, classifies each file (content type,
//! compression, cache tier), uploads in bounded-concurrency batches,
//! then invalidates the CDN cache.

pub mod error;
pub mod invalidator;
pub mod orchestrator;
pub mod scanner;
pub mod scheduler;
pub mod types;
pub mod uploader;

pub use error::DeployError;
pub use invalidator::{BASE_PATHS, InvalidationOutcome, invalidate, invalidation_paths};
pub use orchestrator::Deployer;
pub use scanner::{SiteFile, scan_site_files};
pub use scheduler::{CONCURRENCY_LIMIT, upload_all};
pub use types::{DeployOutcome, UploadSummary, UploadTask};

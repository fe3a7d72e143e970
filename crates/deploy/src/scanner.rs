//! Build-output scanning.
//!
//! Recursively walks the build root and produces one entry per leaf
//! file with its remote key: the root-relative path normalized to
//! forward slashes (S3 keys use `/` even on Windows).

use std::path::{Path, PathBuf};

use crate::error::DeployError;

/// A discovered site file and its destination key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFile {
    pub local_path: PathBuf,
    pub remote_key: String,
}

/// Scans `root` recursively, skipping excluded entries.
///
/// Exclude patterns match a whole path component (`.DS_Store`,
/// `node_modules`) or a filename suffix when prefixed with `*`
/// (`*.map`). Results are sorted by remote key so batch composition
/// is deterministic.
pub fn scan_site_files(root: &Path, exclude: &[String]) -> Result<Vec<SiteFile>, DeployError> {
    let mut files = Vec::new();
    walk_dir(root, root, exclude, &mut files)?;
    files.sort_by(|a, b| a.remote_key.cmp(&b.remote_key));
    Ok(files)
}

fn walk_dir(
    root: &Path,
    current: &Path,
    exclude: &[String],
    files: &mut Vec<SiteFile>,
) -> Result<(), DeployError> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;

        let name = entry.file_name().to_string_lossy().into_owned();
        if is_excluded(&name, exclude) {
            continue;
        }

        if metadata.is_dir() {
            walk_dir(root, &path, exclude, files)?;
        } else if metadata.is_file() {
            let rel_path = path.strip_prefix(root).map_err(std::io::Error::other)?;
            let remote_key = rel_path.to_string_lossy().replace('\\', "/");
            files.push(SiteFile {
                local_path: path,
                remote_key,
            });
        }
    }
    Ok(())
}

fn is_excluded(name: &str, exclude: &[String]) -> bool {
    exclude.iter().any(|pattern| {
        if let Some(suffix) = pattern.strip_prefix('*') {
            name.ends_with(suffix)
        } else {
            name == pattern
        }
    })
}

//! Transient gzip compression for upload payloads.
//!
//! Compressible files are gzipped to a `.gz` sibling immediately
//! before upload and removed immediately after, success or failure.
//! [`CompressedFile`] ties the temp file's lifetime to a guard so it
//! is never left behind.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

/// Errors produced while compressing a file.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A gzip-compressed temp file, deleted when the guard drops.
#[derive(Debug)]
pub struct CompressedFile {
    path: PathBuf,
}

impl CompressedFile {
    /// Path of the compressed file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CompressedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            // The upload already finished either way; a leftover temp
            // file is only worth a warning.
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove temp file");
        }
    }
}

/// Gzips `input` to a `.gz` sibling at maximum compression.
///
/// The output is fully written and flushed before returning. On any
/// I/O failure the partial output file is removed and the error is
/// propagated.
pub fn gzip_file(input: &Path) -> Result<CompressedFile, CompressError> {
    let mut out_name = input.as_os_str().to_os_string();
    out_name.push(".gz");
    let output = PathBuf::from(out_name);

    match write_gzip(input, &output) {
        Ok(()) => Ok(CompressedFile { path: output }),
        Err(e) => {
            let _ = std::fs::remove_file(&output);
            Err(e)
        }
    }
}

fn write_gzip(input: &Path, output: &Path) -> Result<(), CompressError> {
    let mut reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);
    let mut encoder = GzEncoder::new(writer, Compression::best());

    io::copy(&mut reader, &mut encoder)?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    Ok(())
}

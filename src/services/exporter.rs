//! Zip packaging of finished projects.

use std::io::{Cursor, Write};
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ProjectError;

/// One file to place in the archive
#[derive(Debug, Clone)]
pub struct ExportEntry {
    /// Path inside the archive, `/`-separated
    pub name: String,
    pub source: PathBuf,
}

/// Build an in-memory zip of `entries`, in order.
///
/// PNGs are already deflated, so entries are stored uncompressed.
pub fn build_archive(entries: &[ExportEntry]) -> Result<Vec<u8>, ProjectError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for entry in entries {
        let bytes = std::fs::read(&entry.source)?;
        zip.start_file(entry.name.as_str(), options)?;
        zip.write_all(&bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

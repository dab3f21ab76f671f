//! Extraction of every entry of a container to a directory

use super::error::PupResult;
use super::naming::output_path;
use super::reader::PupReader;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Summary of an extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Output files written
    pub files_written: usize,
    /// Special entries skipped
    pub entries_skipped: usize,
    /// Total bytes written
    pub bytes_written: u64,
    /// Relative paths of the written files, in directory order
    pub paths: Vec<PathBuf>,
}

/// Extract every non-special entry into `output_dir`
///
/// Entries are written in directory order, each file complete before the next
/// one starts. The first error aborts the run.
pub fn extract_all<R: Read + Seek>(reader: &mut PupReader<R>, output_dir: &Path) -> PupResult<ExtractStats> {
    fs::create_dir_all(output_dir)?;
    let mut stats = ExtractStats::default();

    for index in 0..reader.entries().len() {
        let Some(relative) = output_path(reader.entries(), reader.tables(), index) else {
            debug!("Skipping special entry {}", index);
            stats.entries_skipped += 1;
            continue;
        };

        let path = output_dir.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut output = BufWriter::new(File::create(&path)?);
        let written = reader.extract_entry(index, &mut output)?;
        output.flush()?;

        info!("{}/{}: {} ({} bytes)", index + 1, reader.entries().len(), relative.display(), written);
        stats.files_written += 1;
        stats.bytes_written += written;
        stats.paths.push(relative);
    }

    info!(
        "Extracted {} files ({} bytes), skipped {} entries",
        stats.files_written, stats.bytes_written, stats.entries_skipped
    );
    Ok(stats)
}

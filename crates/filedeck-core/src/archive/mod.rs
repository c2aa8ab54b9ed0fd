//! Zip archiving of confined files and directories.
//!
//! Archives are materialized in full to a temporary file before anything is
//! sent, so a failure never produces a truncated download. The temporary file
//! belongs to the returned [`ArchiveJob`] and is removed when the job, or the
//! [`TempPath`] taken from it, is dropped.

pub mod report;
pub mod walker;
pub mod zip;

pub use report::ArchiveReport;
pub use walker::ArchiveEntry;

use crate::FileDeckError;
use crate::Result;
use crate::archive::walker::collect_entries;
use crate::archive::zip::write_zip;
use crate::types::ConfinedPath;
use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;
use tempfile::TempPath;

/// Fallback download name when the target has no base name.
const DEFAULT_ARCHIVE_NAME: &str = "archive";

/// Builds zip archives in a scratch directory.
///
/// # Examples
///
/// ```no_run
/// use filedeck_core::Archiver;
/// use filedeck_core::PathResolver;
/// use filedeck_core::RootDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = RootDir::new("/srv/files")?;
/// let target = PathResolver::new(&root).resolve("reports")?;
///
/// let job = Archiver::new(std::env::temp_dir().as_path()).create(&target)?;
/// println!("{} -> {} files", job.download_name(), job.report().files_added);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Archiver<'a> {
    scratch_dir: &'a Path,
}

impl<'a> Archiver<'a> {
    /// Creates an archiver writing its temporary files to `scratch_dir`.
    #[must_use]
    pub const fn new(scratch_dir: &'a Path) -> Self {
        Self { scratch_dir }
    }

    /// Archives `target`.
    ///
    /// A regular file becomes a single entry named by its base name. A
    /// directory contributes every regular file below it, named by its path
    /// relative to the directory; directories themselves are not stored.
    ///
    /// # Errors
    ///
    /// - `FileDeckError::FileNotFound` if `target` is neither a regular file
    ///   nor a directory (or vanished)
    /// - `FileDeckError::ArchiveCreationFailed` if the temporary file cannot
    ///   be created or written; nothing is left behind in that case
    pub fn create(&self, target: &ConfinedPath) -> Result<ArchiveJob> {
        let start = Instant::now();
        let metadata = std::fs::metadata(target.as_path()).map_err(|_| {
            FileDeckError::FileNotFound {
                path: target.as_path().to_path_buf(),
            }
        })?;

        let mut report = ArchiveReport::default();
        let entries = if metadata.is_dir() {
            collect_entries(target.as_path(), &mut report)
        } else if metadata.is_file() {
            vec![ArchiveEntry {
                name: entry_base_name(target),
                source: target.as_path().to_path_buf(),
            }]
        } else {
            return Err(FileDeckError::FileNotFound {
                path: target.as_path().to_path_buf(),
            });
        };

        let mut temp = tempfile::Builder::new()
            .prefix(".filedeck-")
            .suffix(".zip")
            .tempfile_in(self.scratch_dir)
            .map_err(|e| {
                FileDeckError::archive_failed(format!(
                    "cannot create temporary file in {}: {e}",
                    self.scratch_dir.display()
                ))
            })?;

        // On error `temp` is dropped here, which deletes the partial file.
        write_zip(temp.as_file_mut(), &entries, &mut report)?;
        temp.as_file_mut()
            .rewind()
            .map_err(FileDeckError::archive_failed)?;
        report.bytes_compressed = temp
            .as_file()
            .metadata()
            .map_err(FileDeckError::archive_failed)?
            .len();
        report.duration = start.elapsed();

        for warning in &report.warnings {
            tracing::warn!(archive = %target.display_relative(), "{warning}");
        }

        Ok(ArchiveJob {
            source: target.clone(),
            download_name: format!("{}.zip", entry_base_name(target)),
            temp,
            entries,
            report,
        })
    }
}

fn entry_base_name(target: &ConfinedPath) -> String {
    target.file_name().map_or_else(
        || DEFAULT_ARCHIVE_NAME.to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// A finished archive waiting to be sent.
///
/// The temporary zip lives exactly as long as this job, or as long as the
/// [`TempPath`] returned by [`ArchiveJob::into_parts`].
#[derive(Debug)]
pub struct ArchiveJob {
    source: ConfinedPath,
    download_name: String,
    temp: NamedTempFile,
    entries: Vec<ArchiveEntry>,
    report: ArchiveReport,
}

impl ArchiveJob {
    /// The archived file or directory.
    #[must_use]
    pub const fn source(&self) -> &ConfinedPath {
        &self.source
    }

    /// Suggested file name for the download (`<base name>.zip`).
    #[must_use]
    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    /// Location of the temporary zip file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Size of the finished zip in bytes.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.report.bytes_compressed
    }

    /// Returns `true` if the zip file has no bytes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.report.bytes_compressed == 0
    }

    /// Entry name to source path mappings that were scheduled.
    #[must_use]
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Creation statistics.
    #[must_use]
    pub const fn report(&self) -> &ArchiveReport {
        &self.report
    }

    /// Splits the job into the open zip file, positioned at the start, and the
    /// guard that deletes it on drop.
    ///
    /// Keep the `TempPath` alive until the file has been fully streamed.
    #[must_use]
    pub fn into_parts(self) -> (File, TempPath) {
        self.temp.into_parts()
    }
}

//! Archive creation reporting.

use std::time::Duration;

/// Report of an archive creation operation.
///
/// # Examples
///
/// ```
/// use filedeck_core::archive::ArchiveReport;
///
/// let mut report = ArchiveReport::default();
/// report.files_added = 2;
/// report.add_warning("Skipped symlink: docs/latest");
///
/// assert!(report.has_warnings());
/// assert_eq!(report.files_skipped, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// Number of files added to the archive.
    pub files_added: usize,

    /// Total bytes read from source files (uncompressed).
    pub bytes_written: u64,

    /// Size of the finished archive in bytes.
    pub bytes_compressed: u64,

    /// Number of entries skipped (symlinks, unreadable or unnamed entries).
    pub files_skipped: usize,

    /// Duration of the creation operation.
    pub duration: Duration,

    /// Warnings generated during creation.
    pub warnings: Vec<String>,
}

impl ArchiveReport {
    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Records a skipped entry together with the reason.
    pub fn skip(&mut self, msg: impl Into<String>) {
        self.files_skipped += 1;
        self.add_warning(msg);
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

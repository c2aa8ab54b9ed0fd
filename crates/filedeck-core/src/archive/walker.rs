//! Collection of the files that make up an archive.

use crate::archive::report::ArchiveReport;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// One file scheduled for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name inside the archive, `/`-separated.
    pub name: String,

    /// Absolute source path on disk.
    pub source: PathBuf,
}

/// Collects the leaf files below `base` with names relative to `base`.
///
/// Directories produce no entries of their own; their structure survives in
/// the `/`-separated names. Symlinks are not followed and are skipped, as are
/// entries whose name is not valid UTF-8 and directories that cannot be read.
/// Each skip is recorded in `report`. Entries come out sorted by name within
/// each directory, so archives of the same tree are laid out identically.
pub fn collect_entries(base: &Path, report: &mut ArchiveReport) -> Vec<ArchiveEntry> {
    let walker = WalkDir::new(base)
        .follow_links(false)
        .sort_by_file_name();

    let mut entries = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let location = e.path().map_or_else(String::new, |p| p.display().to_string());
                report.skip(format!("Skipped unreadable entry: {location} ({e})"));
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if file_type.is_symlink() {
            report.skip(format!("Skipped symlink: {}", entry.path().display()));
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        match normalize_zip_path(relative) {
            Some(name) => entries.push(ArchiveEntry {
                name,
                source: entry.path().to_path_buf(),
            }),
            None => report.skip(format!(
                "Skipped entry with non UTF-8 name: {}",
                entry.path().display()
            )),
        }
    }

    entries
}

/// Normalizes a relative path for the ZIP format.
///
/// ZIP requires forward slashes (/) regardless of platform.
fn normalize_zip_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        parts.push(component.as_os_str().to_str()?);
    }
    Some(parts.join("/"))
}

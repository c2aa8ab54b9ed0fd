//! Directory listing with permission metadata.

use crate::FileDeckError;
use crate::Result;
use crate::security::access;
use crate::security::probe::subtree_is_deletable;
use crate::types::ConfinedPath;
use crate::types::EntryKind;
use crate::types::FileEntry;
use crate::types::confined_path::slash_join;
use crate::types::entry::has_image_extension;
use std::ffi::OsStr;
use std::fs;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Result of listing one directory.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Whether the listed directory itself is writable (new folders and
    /// uploads can be placed in it).
    pub is_writable: bool,

    /// Immediate children, in filesystem enumeration order.
    pub entries: Vec<FileEntry>,
}

/// Produces [`Listing`]s for confined directories.
///
/// Only immediate children are listed. `.` and `..` never appear, and the
/// configured hidden entry name is skipped.
///
/// Children that vanish or cannot be stat'ed between enumeration and stat are
/// skipped silently: directory contents are a moving target and one racing
/// entry must not fail the whole listing.
///
/// # Examples
///
/// ```no_run
/// use filedeck_core::DirectoryLister;
/// use filedeck_core::PathResolver;
/// use filedeck_core::RootDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = RootDir::new("/srv/files")?;
/// let dir = PathResolver::new(&root).resolve("reports")?;
/// let listing = DirectoryLister::new(None).list(&dir)?;
/// for entry in &listing.entries {
///     println!("{} deletable={}", entry.name, entry.deletable);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryLister<'a> {
    hidden_entry: Option<&'a OsStr>,
}

impl<'a> DirectoryLister<'a> {
    /// Creates a lister that omits `hidden_entry` from every listing.
    #[must_use]
    pub const fn new(hidden_entry: Option<&'a OsStr>) -> Self {
        Self { hidden_entry }
    }

    /// Lists the immediate children of `dir`.
    ///
    /// # Errors
    ///
    /// Returns `FileDeckError::NotADirectory` if `dir` is not a directory, or
    /// an I/O error if the directory cannot be enumerated at all.
    pub fn list(&self, dir: &ConfinedPath) -> Result<Listing> {
        if !dir.as_path().is_dir() {
            return Err(FileDeckError::NotADirectory {
                path: dir.as_path().to_path_buf(),
            });
        }

        let parent_writable = access::is_writable(dir.as_path());
        let mut entries = Vec::new();

        for dirent in fs::read_dir(dir.as_path())? {
            let dirent = match dirent {
                Ok(dirent) => dirent,
                Err(e) => {
                    tracing::debug!(
                        dir = %dir.as_path().display(),
                        error = %e,
                        "skipping unreadable entry"
                    );
                    continue;
                }
            };

            let name = dirent.file_name();
            if self.hidden_entry == Some(name.as_os_str()) {
                continue;
            }

            if let Some(entry) = describe(dir, &name, parent_writable) {
                entries.push(entry);
            }
        }

        Ok(Listing {
            is_writable: parent_writable,
            entries,
        })
    }
}

/// Builds the snapshot for one child, or `None` if it cannot be stat'ed.
fn describe(dir: &ConfinedPath, name: &OsStr, parent_writable: bool) -> Option<FileEntry> {
    let full_path = dir.as_path().join(name);

    // Follows symlinks: a dangling link has nothing to describe.
    let metadata = match fs::metadata(&full_path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::debug!(
                path = %full_path.display(),
                error = %e,
                "skipping entry that cannot be stat'ed"
            );
            return None;
        }
    };
    let is_symlink = fs::symlink_metadata(&full_path).is_ok_and(|m| m.file_type().is_symlink());

    let kind = if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };

    // A symlink is removed by unlinking it, whatever it points to.
    let deletable = if kind.is_directory() && !is_symlink {
        parent_writable && subtree_is_deletable(&full_path)
    } else {
        parent_writable
    };

    let display_name = name.to_string_lossy().into_owned();
    let is_image = metadata.is_file() && has_image_extension(&display_name);

    Some(FileEntry {
        path: slash_join(&dir.relative().join(name)),
        name: display_name,
        size: metadata.len(),
        modified: metadata.modified().map_or(0, unix_seconds),
        kind,
        readable: access::is_readable(&full_path),
        writable: access::is_writable(&full_path),
        executable: access::is_executable(&full_path),
        deletable,
        is_image,
    })
}

fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(before) => {
            i64::try_from(before.duration().as_secs()).map_or(i64::MIN, |secs| -secs)
        }
    }
}

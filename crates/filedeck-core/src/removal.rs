//! Best-effort recursive removal.

use crate::FileDeckError;
use crate::RemovalFailure;
use crate::Result;
use crate::types::ConfinedPath;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Statistics of a completed removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// Number of files and symlinks unlinked.
    pub files_removed: usize,

    /// Number of directories removed.
    pub directories_removed: usize,
}

impl RemovalReport {
    /// Total number of nodes removed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.files_removed + self.directories_removed
    }
}

/// Deletes files and directory trees inside the root.
///
/// Removal is immediate and irreversible. A file or symlink is unlinked (a
/// symlink's target is never touched, even when the symlink itself is the
/// path passed in); a directory is emptied depth-first and then removed.
/// Resolve the target with [`crate::PathResolver::resolve_node`] so that a
/// symlink in final position reaches the deleter as a link.
///
/// The deleter does not consult [`crate::is_recursively_deletable`] first: it
/// attempts every node and records the ones that fail. A failing node does not
/// stop its siblings from being removed. Directories above a failed node
/// cannot be emptied and are reported as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveDeleter;

impl RecursiveDeleter {
    /// Creates a new deleter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Removes `path` and, for a directory, everything below it.
    ///
    /// # Errors
    ///
    /// - `FileDeckError::ProtectedPath` if `path` is the root directory
    /// - `FileDeckError::PartialFailure` listing every node left behind, if
    ///   any node could not be removed
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filedeck_core::FileDeckError;
    /// use filedeck_core::PathResolver;
    /// use filedeck_core::RecursiveDeleter;
    /// use filedeck_core::RootDir;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let root = RootDir::new("/srv/files")?;
    /// let target = PathResolver::new(&root).resolve("old-builds")?;
    ///
    /// match RecursiveDeleter::new().remove(&target) {
    ///     Ok(report) => println!("removed {} entries", report.total()),
    ///     Err(FileDeckError::PartialFailure { failures }) => {
    ///         for failure in failures {
    ///             eprintln!("left behind: {failure}");
    ///         }
    ///     }
    ///     Err(e) => return Err(e.into()),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn remove(&self, path: &ConfinedPath) -> Result<RemovalReport> {
        remove_tree(path, remove_node)
    }
}

/// Walks `path` post-order and hands every node to `remove`.
fn remove_tree<F>(path: &ConfinedPath, mut remove: F) -> Result<RemovalReport>
where
    F: FnMut(&Path, bool) -> io::Result<()>,
{
    if path.is_root() {
        return Err(FileDeckError::ProtectedPath);
    }

    let mut report = RemovalReport::default();
    let mut failures = Vec::new();

    // Post-order walk: contents come before their directory. Symlinks are
    // yielded as links and never descended into, the starting path included.
    let walker = WalkDir::new(path.as_path())
        .follow_links(false)
        .follow_root_links(false)
        .contents_first(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // The directory itself is still yielded afterwards and its
                // removal failure is what gets reported.
                tracing::debug!(error = %e, "cannot enumerate during removal");
                continue;
            }
        };

        let is_dir = entry.file_type().is_dir();
        match remove(entry.path(), is_dir) {
            Ok(()) if is_dir => report.directories_removed += 1,
            Ok(()) => report.files_removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Removed concurrently; the goal is met.
            }
            Err(e) => {
                tracing::warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "failed to remove"
                );
                failures.push(RemovalFailure {
                    path: entry.path().to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(report)
    } else {
        Err(FileDeckError::PartialFailure { failures })
    }
}

fn remove_node(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

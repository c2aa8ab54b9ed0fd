//! Recursive deletability probe.

use crate::security::access::is_readable;
use crate::security::access::is_writable;
use crate::types::ConfinedPath;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Returns `true` if every directory in the subtree rooted at `path` is both
/// readable and writable by the current process.
///
/// Removing a directory tree requires listing and unlinking inside each
/// directory, so only directory permissions matter here. File permissions are
/// not checked. For a plain file the answer reduces to "parent is writable",
/// which [`crate::DirectoryLister`] computes itself; passing a file here only
/// checks the file's own read/write access.
///
/// The walk is depth-first with an explicit stack and stops at the first
/// directory that fails the check. Symlinks are never followed, so cycles
/// cannot make it loop. A directory that cannot be enumerated makes the probe
/// return `false`.
///
/// The result is advisory: it may be stale as soon as it is returned, and
/// [`crate::RecursiveDeleter`] does not rely on it.
#[must_use]
pub fn is_recursively_deletable(path: &ConfinedPath) -> bool {
    subtree_is_deletable(path.as_path())
}

pub(crate) fn subtree_is_deletable(start: &Path) -> bool {
    subtree_permits(start, |dir| is_readable(dir) && is_writable(dir))
}

/// Walks the directories below `start` until `permits` rejects one.
fn subtree_permits<F>(start: &Path, permits: F) -> bool
where
    F: Fn(&Path) -> bool,
{
    let mut stack: Vec<PathBuf> = vec![start.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if !permits(&dir) {
            return false;
        }

        let Ok(entries) = fs::read_dir(&dir) else {
            return false;
        };

        for entry in entries {
            let Ok(entry) = entry else {
                return false;
            };
            // DirEntry::file_type does not follow symlinks.
            if entry.file_type().is_ok_and(|ft| ft.is_dir()) {
                stack.push(entry.path());
            }
        }
    }

    true
}

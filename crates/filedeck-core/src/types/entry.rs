//! Directory listing snapshot types.

use std::path::Path;

/// Kind of node in a directory listing.
///
/// The kind is taken from a stat that follows symlinks, so a link to a
/// directory lists as [`EntryKind::Directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file (or anything that is not a directory).
    File,

    /// Directory.
    Directory,
}

impl EntryKind {
    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }
}

/// Snapshot of one child node taken while listing a directory.
///
/// Entries are built fresh for every listing and go stale immediately: the
/// permission flags are advisory and may be wrong by the time a client acts on
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Base name of the node.
    pub name: String,

    /// Path relative to the root, `/`-separated.
    pub path: String,

    /// Size in bytes as reported by stat (the node's own size for
    /// directories, not the subtree size).
    pub size: u64,

    /// Last modification time in seconds since the Unix epoch.
    pub modified: i64,

    /// File or directory.
    pub kind: EntryKind,

    /// The process may read the node.
    pub readable: bool,

    /// The process may write the node.
    pub writable: bool,

    /// The process may execute (or, for directories, traverse) the node.
    pub executable: bool,

    /// The node can be removed with [`crate::RecursiveDeleter`].
    pub deletable: bool,

    /// Regular file with a common web image extension.
    pub is_image: bool,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Returns `true` if `name` ends in a web image extension (case-insensitive).
///
/// # Examples
///
/// ```
/// use filedeck_core::types::entry::has_image_extension;
///
/// assert!(has_image_extension("photo.JPG"));
/// assert!(has_image_extension("anim.webp"));
/// assert!(!has_image_extension("notes.txt"));
/// assert!(!has_image_extension("png"));
/// ```
#[must_use]
pub fn has_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

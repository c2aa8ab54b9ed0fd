//! Path type proven to lie inside the root directory.

use std::ffi::OsStr;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// An absolute, canonical path that lies inside the [`RootDir`].
///
/// `ConfinedPath` represents a path that has been verified to:
/// - Exist at the time of resolution
/// - Have all symlinks and `.`/`..` components resolved
/// - Be the root directory itself or a strict descendant of it
///
/// Paths from [`PathResolver::resolve_node`] are the one exception: their
/// final component may be a symlink, which is kept as the link node rather
/// than followed. The link itself lives inside the root; its target may not.
///
/// # Security Properties
///
/// - Can ONLY be constructed through [`PathResolver`] or by creating a child
///   inside a confined directory
/// - NO `From<PathBuf>` or `From<&str>` implementation (security critical)
/// - Carries its root-relative form for display, so the absolute root never
///   has to be exposed to clients
///
/// Confinement holds at construction time only. The filesystem is shared, so
/// operations taking a `ConfinedPath` must still tolerate the node vanishing
/// or changing type before they act.
///
/// [`RootDir`]: crate::RootDir
/// [`PathResolver`]: crate::PathResolver
/// [`PathResolver::resolve_node`]: crate::PathResolver::resolve_node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfinedPath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl ConfinedPath {
    /// Creates a `ConfinedPath` without checking containment.
    ///
    /// Callers must guarantee that `absolute` equals `root.join(relative)`
    /// for the active root and is canonical up to its final component.
    pub(crate) fn new_unchecked(absolute: PathBuf, relative: PathBuf) -> Self {
        Self { absolute, relative }
    }

    /// Returns a confined path for a direct child of this directory, such as
    /// one that was just created in it.
    ///
    /// The child must not be a symlink: only then does the join stay
    /// canonical.
    pub(crate) fn child(&self, name: &OsStr) -> Self {
        Self {
            absolute: self.absolute.join(name),
            relative: self.relative.join(name),
        }
    }

    /// Returns the absolute path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Converts into the inner absolute `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.absolute
    }

    /// Returns the path relative to the root (empty for the root itself).
    #[inline]
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Returns `true` if this path is the root directory itself.
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    /// Returns the final component of the path, if it is not the root.
    #[must_use]
    pub fn file_name(&self) -> Option<&OsStr> {
        if self.is_root() {
            None
        } else {
            self.absolute.file_name()
        }
    }

    /// Returns the root-relative path with `/` separators on every platform.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filedeck_core::PathResolver;
    /// use filedeck_core::RootDir;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let root = RootDir::new("/srv/files")?;
    /// let path = PathResolver::new(&root).resolve("reports/2024/")?;
    /// assert_eq!(path.display_relative(), "reports/2024");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn display_relative(&self) -> String {
        slash_join(&self.relative)
    }
}

/// Joins the normal components of `path` with `/`.
pub(crate) fn slash_join(path: &Path) -> String {
    let mut joined = String::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            if !joined.is_empty() {
                joined.push('/');
            }
            joined.push_str(&part.to_string_lossy());
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confined(root: &str, relative: &str) -> ConfinedPath {
        ConfinedPath::new_unchecked(Path::new(root).join(relative), PathBuf::from(relative))
    }

    #[test]
    fn test_root_path() {
        let path = confined("/srv/files", "");
        assert!(path.is_root());
        assert_eq!(path.file_name(), None);
        assert_eq!(path.display_relative(), "");
    }

    #[test]
    fn test_nested_path() {
        let path = confined("/srv/files", "reports/q1.csv");
        assert!(!path.is_root());
        assert_eq!(path.file_name(), Some(OsStr::new("q1.csv")));
        assert_eq!(path.display_relative(), "reports/q1.csv");
        assert_eq!(path.as_path(), Path::new("/srv/files/reports/q1.csv"));
    }

    #[test]
    fn test_child() {
        let parent = confined("/srv/files", "reports");
        let child = parent.child(OsStr::new("q1.csv"));
        assert_eq!(child.relative(), Path::new("reports/q1.csv"));
        assert_eq!(child.as_path(), Path::new("/srv/files/reports/q1.csv"));

        let top = confined("/srv/files", "").child(OsStr::new("a.txt"));
        assert_eq!(top.display_relative(), "a.txt");
    }

    #[test]
    fn test_slash_join() {
        assert_eq!(slash_join(Path::new("a/b/c")), "a/b/c");
        assert_eq!(slash_join(Path::new("")), "");
        assert_eq!(slash_join(Path::new("single")), "single");
    }
}

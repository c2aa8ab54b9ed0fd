//! Resolution of client-supplied paths into confined paths.

use crate::FileDeckError;
use crate::Result;
use crate::types::ConfinedPath;
use crate::types::RootDir;
use std::fs;
use std::path::Component;
use std::path::Path;

/// Turns untrusted path strings into [`ConfinedPath`] values.
///
/// Resolution steps:
/// 1. Reject strings containing a NUL byte
/// 2. Treat the string as relative to the root unless it is absolute
/// 3. Canonicalize (resolve symlinks, collapse `.` and `..`)
/// 4. Accept only the root itself or a path below it
///
/// Missing targets and escape attempts produce the same
/// [`FileDeckError::InvalidPath`], so a client cannot learn whether a path
/// outside the root exists.
///
/// Containment is checked component-wise: with root `/srv/files`, the sibling
/// `/srv/files2` is rejected. Case is compared as the filesystem reports it
/// after canonicalization; no extra case folding is done on case-insensitive
/// platforms.
///
/// # Examples
///
/// ```no_run
/// use filedeck_core::PathResolver;
/// use filedeck_core::RootDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = RootDir::new("/srv/files")?;
/// let resolver = PathResolver::new(&root);
///
/// let reports = resolver.resolve("reports")?;
/// assert!(reports.as_path().starts_with(root.as_path()));
///
/// assert!(resolver.resolve("../../etc/passwd").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    root: &'a RootDir,
}

impl<'a> PathResolver<'a> {
    /// Creates a resolver bound to `root`.
    #[must_use]
    pub const fn new(root: &'a RootDir) -> Self {
        Self { root }
    }

    /// Resolves `raw` to a confined path.
    ///
    /// An empty string resolves to the root, like `.`.
    ///
    /// # Errors
    ///
    /// Returns `FileDeckError::InvalidPath` if the target does not exist or
    /// lies outside the root (directly, via `..`, or through a symlink).
    pub fn resolve(&self, raw: &str) -> Result<ConfinedPath> {
        if raw.contains('\0') {
            return Err(FileDeckError::invalid_path(raw));
        }

        self.resolve_path(Path::new(raw), raw)
    }

    fn resolve_path(&self, requested: &Path, raw: &str) -> Result<ConfinedPath> {
        let candidate = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.as_path().join(requested)
        };

        let canonical = candidate
            .canonicalize()
            .map_err(|_| FileDeckError::invalid_path(raw))?;

        let relative = canonical
            .strip_prefix(self.root.as_path())
            .map_err(|_| FileDeckError::invalid_path(raw))?
            .to_path_buf();

        Ok(ConfinedPath::new_unchecked(canonical, relative))
    }

    /// Resolves `raw` to a confined path without following a symlink in the
    /// final component.
    ///
    /// The parent is resolved like [`resolve`](Self::resolve). If the final
    /// component names a symlink, the result is the link itself, wherever it
    /// points (even outside the root or nowhere). Otherwise the result is
    /// the same as `resolve(raw)`. A trailing `/` does not change this.
    ///
    /// This is the resolution to use before removing a node.
    ///
    /// # Errors
    ///
    /// Returns `FileDeckError::InvalidPath` if the parent cannot be resolved
    /// inside the root or the final component does not exist.
    pub fn resolve_node(&self, raw: &str) -> Result<ConfinedPath> {
        if raw.contains('\0') {
            return Err(FileDeckError::invalid_path(raw));
        }

        let requested = Path::new(raw);
        let (Some(parent), Some(Component::Normal(name))) =
            (requested.parent(), requested.components().next_back())
        else {
            return self.resolve(raw);
        };

        let dir = self.resolve_path(parent, raw)?;
        let node = dir.as_path().join(name);
        let metadata = fs::symlink_metadata(&node).map_err(|_| FileDeckError::invalid_path(raw))?;

        if metadata.file_type().is_symlink() {
            let relative = dir.relative().join(name);
            Ok(ConfinedPath::new_unchecked(node, relative))
        } else {
            // A non-link name below a canonical directory is canonical.
            Ok(dir.child(name))
        }
    }

    /// Returns the root this resolver confines to.
    #[must_use]
    pub const fn root(&self) -> &'a RootDir {
        self.root
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_root() -> (TempDir, RootDir) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root_path = temp.path().join("files");
        fs::create_dir(&root_path).expect("failed to create root");
        let root = RootDir::new(&root_path).expect("failed to create root dir");
        (temp, root)
    }

    #[test]
    fn test_resolve_root_forms() {
        let (_temp, root) = create_test_root();
        fs::create_dir(root.as_path().join("sub")).unwrap();
        let resolver = PathResolver::new(&root);

        for raw in ["", ".", "./", "sub/..", "./././"] {
            let path = resolver.resolve(raw).unwrap();
            assert!(path.is_root(), "{raw:?} should resolve to the root");
            assert_eq!(path.as_path(), root.as_path());
        }
    }

    #[test]
    fn test_resolve_nested_file() {
        let (_temp, root) = create_test_root();
        fs::create_dir_all(root.as_path().join("reports/2024")).unwrap();
        fs::write(root.as_path().join("reports/2024/q1.csv"), "a,b").unwrap();

        let path = PathResolver::new(&root)
            .resolve("reports/2024/q1.csv")
            .unwrap();
        assert_eq!(path.display_relative(), "reports/2024/q1.csv");
        assert!(path.as_path().starts_with(root.as_path()));
    }

    #[test]
    fn test_resolve_trailing_slash() {
        let (_temp, root) = create_test_root();
        fs::create_dir(root.as_path().join("reports")).unwrap();

        let path = PathResolver::new(&root).resolve("reports/").unwrap();
        assert_eq!(path.display_relative(), "reports");
    }

    #[test]
    fn test_resolve_rejects_parent_traversal() {
        let (_temp, root) = create_test_root();
        let resolver = PathResolver::new(&root);

        let result = resolver.resolve("../../etc/passwd");
        assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));

        let result = resolver.resolve("..");
        assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));
    }

    #[test]
    fn test_resolve_rejects_existing_sibling() {
        let (temp, root) = create_test_root();
        fs::write(temp.path().join("secret.txt"), "secret").unwrap();

        let result = PathResolver::new(&root).resolve("../secret.txt");
        assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));
    }

    #[test]
    fn test_resolve_rejects_prefix_sibling() {
        let (temp, root) = create_test_root();
        let sibling = temp.path().join("files2");
        fs::create_dir(&sibling).unwrap();

        let resolver = PathResolver::new(&root);
        assert!(resolver.resolve("../files2").is_err());
        assert!(resolver.resolve(sibling.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_resolve_missing_and_escape_are_indistinguishable() {
        let (_temp, root) = create_test_root();
        let resolver = PathResolver::new(&root);

        let missing = resolver.resolve("does-not-exist").unwrap_err();
        let escape = resolver.resolve("../../").unwrap_err();
        assert!(matches!(missing, FileDeckError::InvalidPath { .. }));
        assert!(matches!(escape, FileDeckError::InvalidPath { .. }));
    }

    #[test]
    fn test_resolve_absolute_inside_root() {
        let (_temp, root) = create_test_root();
        fs::write(root.as_path().join("a.txt"), "a").unwrap();

        let absolute = root.as_path().join("a.txt");
        let path = PathResolver::new(&root)
            .resolve(absolute.to_str().unwrap())
            .unwrap();
        assert_eq!(path.display_relative(), "a.txt");
    }

    #[test]
    fn test_resolve_absolute_outside_root() {
        let (temp, root) = create_test_root();
        let result = PathResolver::new(&root).resolve(temp.path().to_str().unwrap());
        assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));
    }

    #[test]
    fn test_resolve_rejects_null_byte() {
        let (_temp, root) = create_test_root();
        let result = PathResolver::new(&root).resolve("a\0b");
        assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlink_escape() {
        let (temp, root) = create_test_root();
        let outside = temp.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("secret.txt"), "secret").unwrap();
        std::os::unix::fs::symlink(&outside, root.as_path().join("escape")).unwrap();

        let resolver = PathResolver::new(&root);
        assert!(resolver.resolve("escape").is_err());
        assert!(resolver.resolve("escape/secret.txt").is_err());
    }

    #[test]
    fn test_resolve_node_plain_entries() {
        let (_temp, root) = create_test_root();
        fs::create_dir(root.as_path().join("docs")).unwrap();
        fs::write(root.as_path().join("docs/a.txt"), "a").unwrap();
        let resolver = PathResolver::new(&root);

        for raw in ["docs", "docs/", "./docs", "docs/../docs"] {
            assert_eq!(
                resolver.resolve_node(raw).unwrap(),
                resolver.resolve(raw).unwrap(),
                "{raw:?}"
            );
        }
        assert!(resolver.resolve_node("docs/..").unwrap().is_root());
        assert!(resolver.resolve_node("").unwrap().is_root());
        assert_eq!(
            resolver.resolve_node("docs/a.txt").unwrap().display_relative(),
            "docs/a.txt"
        );
    }

    #[test]
    fn test_resolve_node_rejects_escape_and_missing() {
        let (_temp, root) = create_test_root();
        let resolver = PathResolver::new(&root);

        for raw in ["../files", "../../etc/passwd", "missing", "a\0b"] {
            let result = resolver.resolve_node(raw);
            assert!(
                matches!(result, Err(FileDeckError::InvalidPath { .. })),
                "{raw:?}"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_node_keeps_final_symlink() {
        let (temp, root) = create_test_root();
        fs::create_dir(root.as_path().join("real")).unwrap();
        std::os::unix::fs::symlink(
            root.as_path().join("real"),
            root.as_path().join("alias"),
        )
        .unwrap();
        std::os::unix::fs::symlink(temp.path(), root.as_path().join("escape")).unwrap();
        std::os::unix::fs::symlink("nowhere", root.as_path().join("dangling")).unwrap();
        let resolver = PathResolver::new(&root);

        for name in ["alias", "escape", "dangling"] {
            let node = resolver.resolve_node(name).unwrap();
            assert_eq!(node.as_path(), root.as_path().join(name));
            assert_eq!(node.display_relative(), name);
        }
        assert!(resolver.resolve_node("escape/files").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_internal_symlink() {
        let (_temp, root) = create_test_root();
        fs::create_dir(root.as_path().join("real")).unwrap();
        std::os::unix::fs::symlink(
            root.as_path().join("real"),
            root.as_path().join("alias"),
        )
        .unwrap();

        let path = PathResolver::new(&root).resolve("alias").unwrap();
        assert_eq!(path.display_relative(), "real");
    }
}

//! Validated root directory type.

use crate::FileDeckError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// The directory every FileDeck operation is confined to.
///
/// This type represents a directory that has been validated to:
/// - Exist on the filesystem
/// - Be a directory (not a file)
/// - Be represented as an absolute canonical path
///
/// It is built once at startup and handed to every component by reference.
/// Unlike an upload target, the root is not required to be writable: a
/// read-only root simply yields listings where nothing is deletable.
///
/// # Examples
///
/// ```no_run
/// use filedeck_core::RootDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = RootDir::new("/srv/files")?;
/// println!("Serving: {}", root.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDir(PathBuf);

impl RootDir {
    /// Creates a new `RootDir` after validating the path.
    ///
    /// # Security Considerations
    ///
    /// The path is canonicalized here, so a root given as a symlink is pinned
    /// to its target at startup. Later replacing the symlink does not move the
    /// root.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist
    /// - The path exists but is not a directory
    /// - The path cannot be canonicalized
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let canonical = path.canonicalize().map_err(|e| {
            FileDeckError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize root {}: {}", path.display(), e),
            ))
        })?;

        if !canonical.is_dir() {
            return Err(FileDeckError::NotADirectory { path: canonical });
        }

        Ok(Self(canonical))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RootDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

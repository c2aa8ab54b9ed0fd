//! Error types for confined filesystem operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `FileDeckError`.
pub type Result<T> = std::result::Result<T, FileDeckError>;

/// A single node that a recursive removal could not delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalFailure {
    /// Absolute path of the node that is still present.
    pub path: PathBuf,
    /// Operating system error reported for the node.
    pub reason: String,
}

impl fmt::Display for RemovalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Errors that can occur while resolving paths or operating on the tree.
#[derive(Error, Debug)]
pub enum FileDeckError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested path escapes the root or does not exist.
    ///
    /// Both cases are reported identically so callers cannot probe for the
    /// existence of paths outside the root.
    #[error("invalid path: {path:?}")]
    InvalidPath {
        /// The raw path as supplied by the client.
        path: String,
    },

    /// A directory operation was requested on something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The resolved path.
        path: PathBuf,
    },

    /// A file operation was requested on something that is not a regular file.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The resolved path.
        path: PathBuf,
    },

    /// The temporary archive could not be created or written.
    #[error("archive creation failed: {reason}")]
    ArchiveCreationFailed {
        /// Underlying failure.
        reason: String,
    },

    /// A recursive removal left some nodes behind.
    #[error("failed to remove {} entries", .failures.len())]
    PartialFailure {
        /// Every node that could not be removed.
        failures: Vec<RemovalFailure>,
    },

    /// A client-supplied entry name is empty or refers to `.`/`..`.
    #[error("invalid name: {name:?}")]
    InvalidName {
        /// The name as supplied by the client.
        name: String,
    },

    /// The operation would remove the root directory itself.
    #[error("refusing to remove the root directory")]
    ProtectedPath,
}

impl FileDeckError {
    /// Returns `true` if this error represents an attempt to act outside the
    /// permitted tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use filedeck_core::FileDeckError;
    ///
    /// let err = FileDeckError::InvalidPath {
    ///     path: "../etc/passwd".into(),
    /// };
    /// assert!(err.is_confinement_violation());
    ///
    /// let err = FileDeckError::InvalidName { name: "".into() };
    /// assert!(!err.is_confinement_violation());
    /// ```
    #[must_use]
    pub const fn is_confinement_violation(&self) -> bool {
        matches!(self, Self::InvalidPath { .. } | Self::ProtectedPath)
    }

    /// Returns a context string for this error, if available.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::ArchiveCreationFailed { reason } => Some(reason),
            Self::InvalidName { name } => Some(name),
            _ => None,
        }
    }

    /// Returns the nodes left behind by a partial removal, if applicable.
    #[must_use]
    pub fn removal_failures(&self) -> Option<&[RemovalFailure]> {
        match self {
            Self::PartialFailure { failures } => Some(failures),
            _ => None,
        }
    }

    pub(crate) fn invalid_path(raw: &str) -> Self {
        Self::InvalidPath {
            path: raw.to_string(),
        }
    }

    pub(crate) fn archive_failed(reason: impl fmt::Display) -> Self {
        Self::ArchiveCreationFailed {
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_display() {
        let err = FileDeckError::invalid_path("../../etc/passwd");
        assert!(err.to_string().contains("invalid path"));
        assert!(err.to_string().contains("../../etc/passwd"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FileDeckError = io_err.into();
        assert!(matches!(err, FileDeckError::Io(_)));
        assert!(!err.is_confinement_violation());
    }

    #[test]
    fn test_partial_failure_display() {
        let err = FileDeckError::PartialFailure {
            failures: vec![
                RemovalFailure {
                    path: PathBuf::from("/srv/files/a"),
                    reason: "permission denied".into(),
                },
                RemovalFailure {
                    path: PathBuf::from("/srv/files"),
                    reason: "directory not empty".into(),
                },
            ],
        };
        assert_eq!(err.to_string(), "failed to remove 2 entries");
        assert_eq!(err.removal_failures().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_removal_failure_display() {
        let failure = RemovalFailure {
            path: PathBuf::from("/srv/files/locked/file.txt"),
            reason: "permission denied".into(),
        };
        assert_eq!(
            failure.to_string(),
            "/srv/files/locked/file.txt: permission denied"
        );
    }

    #[test]
    fn test_is_confinement_violation() {
        assert!(FileDeckError::invalid_path("/etc").is_confinement_violation());
        assert!(FileDeckError::ProtectedPath.is_confinement_violation());

        let err = FileDeckError::NotADirectory {
            path: PathBuf::from("file.txt"),
        };
        assert!(!err.is_confinement_violation());

        let err = FileDeckError::archive_failed("disk full");
        assert!(!err.is_confinement_violation());
    }

    #[test]
    fn test_context() {
        let err = FileDeckError::archive_failed("disk full");
        assert_eq!(err.context(), Some("disk full"));

        let err = FileDeckError::InvalidName { name: "..".into() };
        assert_eq!(err.context(), Some(".."));

        assert_eq!(FileDeckError::ProtectedPath.context(), None);
        assert!(FileDeckError::ProtectedPath.removal_failures().is_none());
    }
}

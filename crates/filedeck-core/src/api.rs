//! High-level API bundling the components behind one configuration.

use crate::FileDeckConfig;
use crate::FileDeckError;
use crate::Result;
use crate::archive::ArchiveJob;
use crate::archive::Archiver;
use crate::listing::DirectoryLister;
use crate::listing::Listing;
use crate::names::base_name;
use crate::removal::RecursiveDeleter;
use crate::removal::RemovalReport;
use crate::security::PathResolver;
use crate::types::ConfinedPath;
use crate::types::RootDir;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;

/// A file opened for download.
#[derive(Debug)]
pub struct Download {
    /// Open handle positioned at the start of the file.
    pub file: File,

    /// Base name to offer the client.
    pub name: String,

    /// Size in bytes at the time the file was opened.
    pub size: u64,
}

/// Entry point for every FileDeck operation.
///
/// Holds the configuration built at startup and hands the relevant parts to
/// each component. All methods perform blocking I/O.
///
/// # Examples
///
/// ```no_run
/// use filedeck_core::FileDeck;
/// use filedeck_core::FileDeckConfig;
/// use filedeck_core::RootDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let deck = FileDeck::new(FileDeckConfig::new(RootDir::new("/srv/files")?));
///
/// let uploads = deck.resolve("uploads")?;
/// let stored = deck.store_file(&uploads, "../evil.sh", &b"echo hi"[..])?;
/// assert_eq!(stored.display_relative(), "uploads/evil.sh");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileDeck {
    config: FileDeckConfig,
}

impl FileDeck {
    /// Creates a new instance from a validated configuration.
    #[must_use]
    pub const fn new(config: FileDeckConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &FileDeckConfig {
        &self.config
    }

    /// Returns the root directory.
    #[must_use]
    pub const fn root(&self) -> &RootDir {
        &self.config.root
    }

    /// Resolves a client-supplied path. See [`PathResolver::resolve`].
    ///
    /// # Errors
    ///
    /// Returns `FileDeckError::InvalidPath` for missing targets and escapes.
    pub fn resolve(&self, raw: &str) -> Result<ConfinedPath> {
        PathResolver::new(&self.config.root).resolve(raw)
    }

    /// Resolves a client path for removal, keeping a final symlink as the
    /// link itself. See [`PathResolver::resolve_node`].
    ///
    /// # Errors
    ///
    /// Returns `FileDeckError::InvalidPath` if the parent escapes the root or
    /// the node does not exist.
    pub fn resolve_node(&self, raw: &str) -> Result<ConfinedPath> {
        PathResolver::new(&self.config.root).resolve_node(raw)
    }

    /// Lists a directory. See [`DirectoryLister::list`].
    ///
    /// # Errors
    ///
    /// Returns `FileDeckError::NotADirectory` if `dir` is not a directory.
    pub fn list(&self, dir: &ConfinedPath) -> Result<Listing> {
        DirectoryLister::new(self.config.hidden_entry.as_deref()).list(dir)
    }

    /// Removes a file or directory tree. See [`RecursiveDeleter::remove`].
    ///
    /// # Errors
    ///
    /// Returns `FileDeckError::ProtectedPath` for the root and
    /// `FileDeckError::PartialFailure` if nodes were left behind.
    pub fn remove(&self, path: &ConfinedPath) -> Result<RemovalReport> {
        RecursiveDeleter::new().remove(path)
    }

    /// Archives a file or directory. See [`Archiver::create`].
    ///
    /// # Errors
    ///
    /// Returns `FileDeckError::ArchiveCreationFailed` if the zip cannot be
    /// materialized.
    pub fn archive(&self, path: &ConfinedPath) -> Result<ArchiveJob> {
        Archiver::new(&self.config.scratch_dir).create(path)
    }

    /// Creates a directory named by the base name of `raw_name` inside
    /// `parent`.
    ///
    /// Creating a directory that already exists succeeds.
    ///
    /// # Errors
    ///
    /// - `FileDeckError::InvalidName` if no usable base name remains
    /// - `FileDeckError::NotADirectory` if `parent` is not a directory
    /// - `FileDeckError::Io` if the directory cannot be created, or the name
    ///   is taken by something that is not a directory
    pub fn create_directory(&self, parent: &ConfinedPath, raw_name: &str) -> Result<ConfinedPath> {
        let name = base_name(raw_name)?;
        ensure_directory(parent)?;

        let target = parent.as_path().join(name);
        match fs::create_dir(&target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let existing = fs::symlink_metadata(&target)?;
                if !existing.is_dir() {
                    return Err(FileDeckError::Io(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{name} already exists and is not a directory"),
                    )));
                }
            }
            Err(e) => return Err(e.into()),
        }

        Ok(parent.child(OsStr::new(name)))
    }

    /// Stores `contents` as a file named by the base name of `raw_name`
    /// inside `parent`, replacing any existing file of that name.
    ///
    /// The data is written to a temporary file in `parent` first and renamed
    /// into place, so an interrupted upload leaves nothing behind. Renaming
    /// over a symlink replaces the link itself, never its target.
    ///
    /// # Errors
    ///
    /// - `FileDeckError::InvalidName` if no usable base name remains
    /// - `FileDeckError::NotADirectory` if `parent` is not a directory
    /// - `FileDeckError::Io` if writing or renaming fails
    pub fn store_file<R: Read>(
        &self,
        parent: &ConfinedPath,
        raw_name: &str,
        mut contents: R,
    ) -> Result<ConfinedPath> {
        let name = base_name(raw_name)?;
        ensure_directory(parent)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(".upload-");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o644));
        }

        let mut temp = builder.tempfile_in(parent.as_path())?;
        io::copy(&mut contents, temp.as_file_mut())?;
        temp.as_file().sync_all()?;
        temp.persist(parent.as_path().join(name))
            .map_err(|e| FileDeckError::Io(e.error))?;

        Ok(parent.child(OsStr::new(name)))
    }

    /// Opens a regular file for download.
    ///
    /// # Errors
    ///
    /// Returns `FileDeckError::FileNotFound` if `path` is not a regular file
    /// or cannot be opened.
    pub fn open_download(&self, path: &ConfinedPath) -> Result<Download> {
        let not_found = || FileDeckError::FileNotFound {
            path: path.as_path().to_path_buf(),
        };

        let file = File::open(path.as_path()).map_err(|_| not_found())?;
        let metadata = file.metadata().map_err(|_| not_found())?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        let name = path.file_name().map_or_else(
            || "download".to_string(),
            |name| name.to_string_lossy().into_owned(),
        );

        Ok(Download {
            file,
            name,
            size: metadata.len(),
        })
    }
}

fn ensure_directory(path: &ConfinedPath) -> Result<()> {
    if path.as_path().is_dir() {
        Ok(())
    } else {
        Err(FileDeckError::NotADirectory {
            path: path.as_path().to_path_buf(),
        })
    }
}

//! Runtime configuration shared by the FileDeck components.

use crate::types::RootDir;
use std::ffi::OsString;
use std::path::PathBuf;

/// Configuration built once at startup and passed to every component.
///
/// # Examples
///
/// ```no_run
/// use filedeck_core::FileDeckConfig;
/// use filedeck_core::RootDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FileDeckConfig::new(RootDir::new("/srv/files")?)
///     .with_hidden_entry("filedeck")
///     .with_scratch_dir("/var/tmp");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileDeckConfig {
    /// Directory all operations are confined to.
    pub root: RootDir,

    /// Entry name omitted from every listing.
    ///
    /// Set to the service's own executable name so a binary deployed inside
    /// the root does not show up in its own listing.
    pub hidden_entry: Option<OsString>,

    /// Directory where temporary archives are materialized.
    ///
    /// Defaults to the system temporary directory so archives never appear
    /// inside the served tree.
    pub scratch_dir: PathBuf,
}

impl FileDeckConfig {
    /// Creates a configuration with no hidden entry and the system temporary
    /// directory as scratch space.
    #[must_use]
    pub fn new(root: RootDir) -> Self {
        Self {
            root,
            hidden_entry: None,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Sets the entry name omitted from listings.
    #[must_use]
    pub fn with_hidden_entry(mut self, name: impl Into<OsString>) -> Self {
        self.hidden_entry = Some(name.into());
        self
    }

    /// Sets the directory used for temporary archives.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let temp = TempDir::new().unwrap();
        let config = FileDeckConfig::new(RootDir::new(temp.path()).unwrap());

        assert!(config.hidden_entry.is_none());
        assert_eq!(config.scratch_dir, std::env::temp_dir());
    }

    #[test]
    fn test_config_builder() {
        let temp = TempDir::new().unwrap();
        let config = FileDeckConfig::new(RootDir::new(temp.path()).unwrap())
            .with_hidden_entry("filedeck")
            .with_scratch_dir(temp.path());

        assert_eq!(config.hidden_entry, Some(OsString::from("filedeck")));
        assert_eq!(config.scratch_dir, temp.path());
    }
}

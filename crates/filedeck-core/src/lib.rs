//! Root-confined filesystem operations for the FileDeck file manager.
//!
//! `filedeck-core` turns untrusted, client-supplied path strings into
//! [`ConfinedPath`] values that are proven to lie inside a single configured
//! root directory, and implements the recursive operations a file manager
//! needs on top of them: listing, deletability probing, recursive removal,
//! and zip archiving.
//!
//! Everything here is synchronous and performs blocking filesystem I/O.
//! Async hosts should run these calls on a blocking thread pool.
//!
//! # Examples
//!
//! ```no_run
//! use filedeck_core::FileDeck;
//! use filedeck_core::FileDeckConfig;
//! use filedeck_core::RootDir;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = RootDir::new("/srv/files")?;
//! let deck = FileDeck::new(FileDeckConfig::new(root));
//!
//! let reports = deck.resolve("reports")?;
//! for entry in deck.list(&reports)?.entries {
//!     println!("{} ({} bytes)", entry.path, entry.size);
//! }
//!
//! // Escapes are rejected before touching anything.
//! assert!(deck.resolve("../../etc/passwd").is_err());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod config;
pub mod error;
pub mod listing;
pub mod names;
pub mod removal;
pub mod security;
pub mod types;

pub use api::Download;
pub use api::FileDeck;
pub use archive::ArchiveJob;
pub use archive::Archiver;
pub use config::FileDeckConfig;
pub use error::FileDeckError;
pub use error::RemovalFailure;
pub use error::Result;
pub use listing::DirectoryLister;
pub use listing::Listing;
pub use removal::RecursiveDeleter;
pub use removal::RemovalReport;
pub use security::PathResolver;
pub use security::is_recursively_deletable;

pub use types::ConfinedPath;
pub use types::EntryKind;
pub use types::FileEntry;
pub use types::RootDir;

//! Type-safe wrappers for confined filesystem access.
//!
//! `RootDir` and `ConfinedPath` enforce confinement at the type level: a
//! `ConfinedPath` can only be obtained from [`crate::PathResolver`] (or by
//! creating a child inside a confined directory), never from a raw string.
//!
//! # Design Principles
//!
//! - No `From<RawType>` implementations for security types
//! - All public constructors perform validation
//! - Listing snapshots (`FileEntry`) are plain data and never cached

pub mod confined_path;
pub mod entry;
pub mod root_dir;

pub use confined_path::ConfinedPath;
pub use entry::EntryKind;
pub use entry::FileEntry;
pub use root_dir::RootDir;

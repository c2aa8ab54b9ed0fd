//! JSON payloads returned by the endpoint.

use filedeck_core::FileEntry;
use filedeck_core::Listing;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Self = Self { success: true };
}

#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub success: bool,
    pub is_writable: bool,
    pub results: Vec<EntryOutput>,
}

/// One listing row. Field names match what the page script reads, including
/// the `is_deleteable` spelling.
#[derive(Debug, Serialize)]
pub struct EntryOutput {
    pub mtime: i64,
    pub size: u64,
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub is_deleteable: bool,
    pub is_readable: bool,
    pub is_writable: bool,
    pub is_executable: bool,
    pub is_image: bool,
}

impl From<FileEntry> for EntryOutput {
    fn from(entry: FileEntry) -> Self {
        Self {
            mtime: entry.modified,
            size: entry.size,
            name: entry.name,
            path: entry.path,
            is_dir: entry.kind.is_directory(),
            is_deleteable: entry.deletable,
            is_readable: entry.readable,
            is_writable: entry.writable,
            is_executable: entry.executable,
            is_image: entry.is_image,
        }
    }
}

impl From<Listing> for ListOutput {
    fn from(listing: Listing) -> Self {
        Self {
            success: true,
            is_writable: listing.is_writable,
            results: listing.entries.into_iter().map(EntryOutput::from).collect(),
        }
    }
}

//! ZIP writing for collected archive entries.

use crate::FileDeckError;
use crate::Result;
use crate::archive::report::ArchiveReport;
use crate::archive::walker::ArchiveEntry;
use std::fs::File;
use std::fs::Metadata;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Files at or above this size need ZIP64 extensions.
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

/// Writes `entries` into a deflate-compressed ZIP on `writer`.
///
/// A source file that vanished or became unreadable after collection is
/// skipped and recorded in `report`; failures of the archive itself abort.
///
/// # Errors
///
/// Returns `FileDeckError::ArchiveCreationFailed` if an entry cannot be
/// started or written, or the central directory cannot be finished.
pub fn write_zip<W: Write + Seek>(
    writer: W,
    entries: &[ArchiveEntry],
    report: &mut ArchiveReport,
) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // Reusable buffer for file copying
    let mut buffer = vec![0u8; 64 * 1024]; // 64 KB

    for entry in entries {
        let mut file = match File::open(&entry.source) {
            Ok(file) => file,
            Err(e) => {
                report.skip(format!(
                    "Skipped unreadable file: {} ({e})",
                    entry.source.display()
                ));
                continue;
            }
        };
        let metadata = file.metadata().ok();
        let size = metadata.as_ref().map_or(0, Metadata::len);
        let file_options =
            entry_options(metadata.as_ref(), options).large_file(size >= ZIP64_THRESHOLD);

        zip.start_file(entry.name.as_str(), file_options)
            .map_err(|e| {
                FileDeckError::archive_failed(format!("failed to start {}: {e}", entry.name))
            })?;

        let mut bytes_written = 0u64;
        loop {
            let bytes_read = file.read(&mut buffer).map_err(|e| {
                FileDeckError::archive_failed(format!(
                    "failed to read {}: {e}",
                    entry.source.display()
                ))
            })?;
            if bytes_read == 0 {
                break;
            }
            zip.write_all(&buffer[..bytes_read])
                .map_err(FileDeckError::archive_failed)?;
            bytes_written += bytes_read as u64;
        }

        report.files_added += 1;
        report.bytes_written += bytes_written;
    }

    zip.finish()
        .map_err(|e| FileDeckError::archive_failed(format!("failed to finish ZIP archive: {e}")))
}

/// Carries the source's Unix permission bits into the entry.
#[cfg(unix)]
fn entry_options(metadata: Option<&Metadata>, options: SimpleFileOptions) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;

    match metadata {
        Some(metadata) => options.unix_permissions(metadata.permissions().mode()),
        None => options,
    }
}

#[cfg(not(unix))]
fn entry_options(_metadata: Option<&Metadata>, options: SimpleFileOptions) -> SimpleFileOptions {
    options
}

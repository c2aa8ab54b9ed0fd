//! Effective permission checks for the current process.
//!
//! On Unix these use `access(2)`, so the answer is what the kernel would
//! allow rather than a hand interpretation of mode bits. Other platforms fall
//! back to metadata.

use std::path::Path;

/// Permission to test for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
    Execute,
}

/// Returns `true` if the current process may read `path`.
#[must_use]
pub fn is_readable(path: &Path) -> bool {
    check_access(path, Access::Read)
}

/// Returns `true` if the current process may write `path`.
///
/// For a directory this means entries can be created and removed in it.
#[must_use]
pub fn is_writable(path: &Path) -> bool {
    check_access(path, Access::Write)
}

/// Returns `true` if the current process may execute `path` (or traverse
/// it, for a directory).
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    check_access(path, Access::Execute)
}

#[cfg(unix)]
fn check_access(path: &Path, access: Access) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };

    let mode = match access {
        Access::Read => libc::R_OK,
        Access::Write => libc::W_OK,
        Access::Execute => libc::X_OK,
    };

    // SAFETY: access() is safe to call with a valid C string.
    // The pointer is valid for the duration of the call.
    // access() does not modify the string and returns immediately.
    #[allow(unsafe_code)]
    let result = unsafe { libc::access(c_path.as_ptr(), mode) };

    result == 0
}

#[cfg(not(unix))]
fn check_access(path: &Path, access: Access) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    match access {
        Access::Read => true,
        Access::Write => !metadata.permissions().readonly(),
        Access::Execute => {
            metadata.is_dir()
                || path.extension().is_some_and(|ext| {
                    ["exe", "bat", "cmd", "com"]
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
        }
    }
}

//! Sanitizing of client-supplied entry names.

use crate::FileDeckError;
use crate::Result;

/// Reduces a client-supplied name to its final path component.
///
/// Both `/` and `\` count as separators, and trailing separators are
/// ignored, so `../evil.sh`, `C:\temp\evil.sh` and `dir/evil.sh/` all become
/// `evil.sh`. Stripping everything but the base name means the result can
/// only ever name an entry directly inside the target directory.
///
/// # Errors
///
/// Returns `FileDeckError::InvalidName` if nothing usable remains: an empty
/// name, `.`, `..`, or a name containing a NUL byte.
///
/// # Examples
///
/// ```
/// use filedeck_core::names::base_name;
///
/// assert_eq!(base_name("../evil.sh").unwrap(), "evil.sh");
/// assert_eq!(base_name("photos/").unwrap(), "photos");
/// assert!(base_name("..").is_err());
/// assert!(base_name("").is_err());
/// ```
pub fn base_name(raw: &str) -> Result<&str> {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    let name = trimmed.rsplit(['/', '\\']).next().unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(FileDeckError::InvalidName {
            name: raw.to_string(),
        });
    }

    Ok(name)
}

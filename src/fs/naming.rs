//! Folder and filename sanitization.

use crate::error::{Error, Result};

/// Characters that are not allowed in folder names on common filesystems.
const INVALID_FOLDER_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turn a channel path into a single folder name.
///
/// Invalid characters (including path separators) are dropped, so `/Root/Files`
/// becomes `RootFiles`. Returns `None` when nothing usable is left, e.g. for
/// the root channel `/`.
pub fn sanitize_channel_folder(path: &str) -> Option<String> {
    let cleaned: String = path
        .chars()
        .filter(|c| !INVALID_FOLDER_CHARS.contains(c) && !c.is_control())
        .collect();

    let cleaned = cleaned.trim().trim_end_matches(&['.', ' '][..]);

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Validate and sanitize a remote filename for local storage.
///
/// Returns an error if the name would escape the target directory.
pub fn sanitize_filename(name: &str) -> Result<String> {
    // Reject path separators, a remote name must stay a single component
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name == "." || name == ".." {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    // Reject null bytes
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    // Sanitize remaining problematic characters
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Reject empty or whitespace-only names
    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

//! Filename sanitization for user-supplied upload names.
//!
//! A sanitized name never contains a path separator, never starts with a dot
//! and only holds `[A-Za-z0-9_.-]`, so it is safe to embed in a storage key
//! and in a `Content-Disposition` header.

use crate::shared::validation::UNSAFE_FILENAME_CHARS;

/// Longest sanitized name kept, leaving room for the id prefix of storage keys
pub const MAX_FILENAME_LEN: usize = 200;

/// Reduces a user-supplied filename to a safe basename.
///
/// Path separators become word breaks, whitespace runs become `_`, any
/// character outside `[A-Za-z0-9_.-]` is dropped and leading/trailing dots
/// and underscores are stripped. Returns `None` when nothing survives.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let spaced = raw.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return None;
    }

    Some(truncate(trimmed))
}

/// Shortens the stem so the whole name fits `MAX_FILENAME_LEN`, keeping the extension.
fn truncate(name: &str) -> String {
    if name.len() <= MAX_FILENAME_LEN {
        return name.to_string();
    }

    // Only ASCII survives sanitization, so byte slicing is safe
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() < MAX_FILENAME_LEN / 2 => {
            let keep = MAX_FILENAME_LEN - ext.len() - 1;
            format!("{}.{}", &stem[..keep.min(stem.len())], ext)
        }
        _ => name[..MAX_FILENAME_LEN].to_string(),
    }
}

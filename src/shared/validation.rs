use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::{ALLOWED_EXTENSIONS, CODE_LENGTH, CODE_PREFIX};

lazy_static! {
    /// Regex for validating retrieval codes
    /// Prefix followed by uppercase hex digits
    /// - Valid: "FV-3F9A0C1D", "FV-00000000"
    /// - Invalid: "FV-3f9a0c1d", "FV-3F9A0C1", "XX-3F9A0C1D", "FV-3F9A0C1G"
    pub static ref RETRIEVAL_CODE_REGEX: Regex = Regex::new(&format!(
        r"^{}[0-9A-F]{{{}}}$",
        regex::escape(CODE_PREFIX),
        CODE_LENGTH
    ))
    .unwrap();

    /// Characters that survive filename sanitization
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// Normalizes a code typed or read aloud by a user.
///
/// Returns `None` when the input cannot be a retrieval code at all.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_uppercase();
    RETRIEVAL_CODE_REGEX.is_match(&code).then_some(code)
}

/// Lowercased extension after the last dot, if any
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn is_extension_allowed(filename: &str) -> bool {
    file_extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

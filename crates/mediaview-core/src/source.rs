//! Source validation
//!
//! Sources are opaque strings; the only check is the container extension.

use crate::{Error, Result};

/// Containers the decoder is expected to handle
pub const DEFAULT_EXTENSIONS: &[&str] = &[".mp4", ".3gp", ".3gpp"];

/// Trim `input` and accept it if it ends with one of `extensions`,
/// compared case-insensitively.
pub fn validate_source<S: AsRef<str>>(input: &str, extensions: &[S]) -> Result<String> {
    let uri = input.trim();
    if uri.is_empty() {
        return Err(Error::InvalidUrl(String::new()));
    }

    let lower = uri.to_lowercase();
    let accepted = extensions
        .iter()
        .any(|ext| lower.ends_with(&ext.as_ref().to_lowercase()));

    if accepted {
        Ok(uri.to_string())
    } else {
        Err(Error::InvalidUrl(uri.to_string()))
    }
}

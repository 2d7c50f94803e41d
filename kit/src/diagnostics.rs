//! Rendering of errors into the diagnostic strings stored on a [`Toml`].
//!
//! [`Toml`]: crate::Toml

use tomltree_core::{LineIndex, SpannedError};

use crate::error::TomlError;

/// `Syntax error at <line>:<col> <message>`
pub fn syntax(lines: &LineIndex, err: &TomlError) -> String {
    let offset = err.span().map(|s| s.start).unwrap_or(0);
    format!("Syntax error at {} {err}", lines.position(offset))
}

/// `<message> from line:col <line>:<col> to <line>:<col>`
pub fn semantic(lines: &LineIndex, err: &TomlError) -> String {
    match err.span() {
        Some(span) => {
            let (start, end) = lines.range(span.start, span.end);
            format!("{err} from line:col {start} to {end}")
        }
        None => err.to_string(),
    }
}

/// Diagnostic for a parse cancelled by a resource limit or bad encoding.
pub fn fatal(lines: &LineIndex, err: &TomlError) -> String {
    match err.span() {
        Some(span) => format!("{err} at {}", lines.position(span.start)),
        None => err.to_string(),
    }
}

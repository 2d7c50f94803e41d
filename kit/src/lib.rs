#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! A conformant, error-recovering TOML parser.
//!
//! Parsing never fails outright. Every entry point returns a [`Toml`] holding
//! the tree that could be built and the list of diagnostics raised along the
//! way; a document is valid exactly when that list is empty.
//!
//! ```
//! let toml = tomltree::parse("[server]\nport = 8080\n");
//! assert!(toml.is_valid());
//! assert_eq!(toml.get_integer("server/port"), Some(8080));
//! ```
//!
//! The pipeline has three stages:
//!
//! 1. [`Lexer`] turns text into tokens, switching token sets as it moves
//!    between keys, values, arrays and inline tables.
//! 2. The grammar in [`parse`](mod@parse) builds an [`ast::Document`],
//!    skipping to the next line after a syntax error.
//! 3. The tree builder in [`visitor`] applies TOML's table rules, un-escapes
//!    strings and converts scalars into [`Value`]s.

use std::io::Read;
use std::path::Path;

use tomltree_core::LineIndex;

pub mod ast;
mod coerce;
mod diagnostics;
mod document;
mod error;
pub mod json;
pub mod lexer;
pub mod parse;
pub mod query;
mod span;
mod stream;
pub mod tokens;
mod traits;
pub mod unescape;
mod value;
pub mod visitor;

pub use document::Toml;
pub use error::{LexError, TomlError};
pub use lexer::{Lexer, Mode, tokenize};
pub use query::FromValue;
pub use span::{Span, Spanned};
pub use stream::TokenStream;
pub use tokens::{SpannedToken, Token};
pub use traits::{Diagnostic, Parse, Peek};
pub use unescape::StringError;
pub use value::{Table, Value};

pub use tomltree_core::{ParseConfig, Position};

// ANCHOR: entry_points
/// Parses `source` with the default configuration.
pub fn parse(source: &str) -> Toml {
    parse_with_config(source, ParseConfig::default())
}

/// Parses `source`. Resource limits that are exceeded cancel the parse: the
/// result is an empty tree with that single diagnostic.
pub fn parse_with_config(source: &str, config: ParseConfig) -> Toml {
    let mut stream = match TokenStream::lex_with_config(source, config) {
        Ok(stream) => stream,
        Err(err) => return cancelled(&LineIndex::new(source), &err),
    };

    let doc = match ast::Document::parse(&mut stream) {
        Ok(doc) => doc,
        Err(err) => return cancelled(stream.lines(), &err),
    };

    let mut errors: Vec<String> = doc
        .errors
        .iter()
        .map(|err| diagnostics::syntax(stream.lines(), err))
        .collect();
    let (root, semantic) = visitor::build(&doc, stream.lines(), config);
    errors.extend(semantic);

    log::debug!(
        "built {} top-level keys with {} diagnostics",
        root.len(),
        errors.len()
    );
    Toml::new(root, errors)
}

/// Parses UTF-8 bytes. Malformed UTF-8 yields an empty tree and a single
/// diagnostic.
pub fn parse_bytes(bytes: &[u8]) -> Toml {
    match std::str::from_utf8(bytes) {
        Ok(source) => parse(source),
        Err(err) => {
            log::debug!("invalid UTF-8 after {} bytes", err.valid_up_to());
            malformed("UTF-8")
        }
    }
}

/// Parses bytes in the given character encoding.
pub fn parse_bytes_with_encoding(bytes: &[u8], encoding: &'static encoding_rs::Encoding) -> Toml {
    match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(source) => parse(&source),
        None => malformed(encoding.name()),
    }
}

/// Reads everything from `reader` and parses it as UTF-8. Only I/O failures
/// are returned as errors.
pub fn parse_reader(mut reader: impl Read) -> Result<Toml, TomlError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(parse_bytes(&bytes))
}

/// Reads and parses the file at `path` as UTF-8.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Toml, TomlError> {
    let path = path.as_ref();
    log::debug!("reading {}", path.display());
    let bytes = std::fs::read(path)?;
    Ok(parse_bytes(&bytes))
}
// ANCHOR_END: entry_points

fn malformed(encoding: &'static str) -> Toml {
    let err = TomlError::MalformedInput { encoding };
    log::warn!("{err}");
    Toml::failed(err.to_string())
}

fn cancelled(lines: &LineIndex, err: &TomlError) -> Toml {
    let message = diagnostics::fatal(lines, err);
    log::warn!("parse cancelled: {message}");
    Toml::failed(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_limit_cancels_the_parse() {
        let toml = parse_with_config("a = 1\nb = 2\n", ParseConfig::new().with_max_tokens(4));
        assert!(toml.root().is_empty());
        assert_eq!(
            toml.errors(),
            ["token limit exceeded: consumed 5 > limit 4 at 1:5"]
        );
    }

    #[test]
    fn syntax_errors_come_before_semantic_ones() {
        let toml = parse("a = 1\na = 2\nb = ]\n");
        assert_eq!(toml.errors().len(), 2);
        assert!(toml.errors()[0].starts_with("Syntax error at 3:5"));
        assert!(toml.errors()[1].starts_with("Key 'a' is defined more than once"));
        assert_eq!(toml.get_integer("a"), Some(1));
    }

    #[test]
    fn invalid_utf8_short_circuits() {
        let toml = parse_bytes(b"a = \"\xff\"");
        assert_eq!(toml.errors(), ["Malformed UTF-8 detected on input"]);
        assert!(toml.root().is_empty());
    }

    #[test]
    fn utf16_input() {
        let bytes: Vec<u8> = "a = 'é'".encode_utf16().flat_map(u16::to_le_bytes).collect();
        let toml = parse_bytes_with_encoding(&bytes, encoding_rs::UTF_16LE);
        assert!(toml.is_valid(), "{:?}", toml.errors());
        assert_eq!(toml.get_string("a"), Some("é"));
    }

    #[test]
    fn reader_input() {
        let toml = parse_reader(&b"x = 1979-05-27T07:32:00Z"[..]).unwrap();
        assert!(toml.get_offset_date_time("x").is_some());
    }
}
